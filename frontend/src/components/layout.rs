//! 已登录页面的外壳：侧边栏、顶栏、主题切换与命令面板

use leptos::ev;
use leptos::prelude::*;
use maisha_shared::STORAGE_THEME_KEY;

use crate::auth::use_auth;
use crate::components::command_palette::CommandPalette;
use crate::components::icons::{Moon, Search, Sun};
use crate::components::sidebar::Sidebar;
use crate::components::widgets::{AccessDenied, Loading};
use crate::web::route::AppRoute;
use crate::web::{KeyValueStore, LocalStorage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// 已保存的偏好优先，否则跟随系统
    pub fn initial(stored: Option<&str>, prefers_dark: bool) -> Self {
        match stored {
            Some("dark") => Theme::Dark,
            Some("light") => Theme::Light,
            _ if prefers_dark => Theme::Dark,
            _ => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    Loading,
    Allowed,
    Denied,
}

fn prefers_dark() -> bool {
    web_sys::window()
        .and_then(|w| w.match_media("(prefers-color-scheme: dark)").ok().flatten())
        .map(|mq| mq.matches())
        .unwrap_or(false)
}

fn apply_theme(theme: Theme) {
    let Some(root) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
    else {
        return;
    };
    if let Err(e) = root.set_attribute("data-theme", theme.as_str()) {
        log::warn!("failed to apply theme: {:?}", e);
    }
    let _ = root
        .class_list()
        .toggle_with_force("dark", theme == Theme::Dark);
}

#[component]
pub fn Shell(route: AppRoute, children: ChildrenFn) -> impl IntoView {
    let auth = use_auth();
    let palette_open = RwSignal::new(false);

    let storage = LocalStorage;
    let theme = RwSignal::new(Theme::initial(
        storage.get(STORAGE_THEME_KEY).as_deref(),
        prefers_dark(),
    ));
    Effect::new(move |_| {
        let current = theme.get();
        apply_theme(current);
        storage.set(STORAGE_THEME_KEY, current.as_str());
    });

    let handle = window_event_listener(ev::keydown, move |ev| {
        if (ev.ctrl_key() || ev.meta_key()) && ev.key().eq_ignore_ascii_case("k") {
            ev.prevent_default();
            palette_open.update(|open| *open = !*open);
        } else if ev.key() == "Escape" {
            palette_open.set(false);
        }
    });
    on_cleanup(move || handle.remove());

    let gate = Memo::new(move |_| {
        if auth.is_loading() {
            return Gate::Loading;
        }
        match route.feature() {
            Some(feature) if !auth.authorize(feature) => Gate::Denied,
            _ => Gate::Allowed,
        }
    });

    view! {
        <div class="flex min-h-screen bg-base-200">
            <Sidebar />
            <div class="flex-1 flex flex-col min-w-0">
                <header class="navbar bg-base-100 border-b border-base-300 px-6 gap-4">
                    <div class="flex-1">
                        <div>
                            <p class="text-xs text-base-content/60">"Maisha App Management System"</p>
                            <h2 class="text-lg font-semibold">{route.title()}</h2>
                        </div>
                    </div>
                    <button class="btn btn-ghost btn-sm gap-2" on:click=move |_| palette_open.set(true)>
                        <Search attr:class="h-4 w-4" />
                        <span class="hidden md:inline text-base-content/60">"Search..."</span>
                        <kbd class="kbd kbd-sm hidden md:inline">"Ctrl K"</kbd>
                    </button>
                    <button
                        class="btn btn-ghost btn-circle btn-sm"
                        title="Toggle theme"
                        on:click=move |_| theme.update(|t| *t = t.toggled())
                    >
                        {move || if theme.get() == Theme::Dark {
                            view! { <Sun attr:class="h-5 w-5" /> }.into_any()
                        } else {
                            view! { <Moon attr:class="h-5 w-5" /> }.into_any()
                        }}
                    </button>
                </header>
                <main class="flex-1 p-6 overflow-auto">
                    {move || match gate.get() {
                        Gate::Loading => view! { <Loading /> }.into_any(),
                        Gate::Allowed => children().into_any(),
                        Gate::Denied => view! { <AccessDenied /> }.into_any(),
                    }}
                </main>
            </div>
            <CommandPalette open=palette_open />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::Theme;

    #[test]
    fn stored_theme_wins_over_system_preference() {
        assert_eq!(Theme::initial(Some("light"), true), Theme::Light);
        assert_eq!(Theme::initial(Some("dark"), false), Theme::Dark);
        assert_eq!(Theme::initial(None, true), Theme::Dark);
        assert_eq!(Theme::initial(Some("sepia"), false), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
    }
}
