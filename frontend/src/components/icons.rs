//! SVG 图标 (Lucide)
//!
//! 使用 `attr:class` 设置尺寸，例如 `<Plus attr:class="h-4 w-4" />`。

use leptos::prelude::*;

macro_rules! icon {
    ($name:ident, $($path:tt),+ $(,)?) => {
        #[component]
        pub fn $name() -> impl IntoView {
            view! {
                <svg
                    xmlns="http://www.w3.org/2000/svg"
                    viewBox="0 0 24 24"
                    fill="none"
                    stroke="currentColor"
                    stroke-width="2"
                    stroke-linecap="round"
                    stroke-linejoin="round"
                >
                    $(<path d=$path />)+
                </svg>
            }
        }
    };
}

icon!(LayoutDashboard, "M3 3h7v9H3z", "M14 3h7v5h-7z", "M14 12h7v9h-7z", "M3 16h7v5H3z");
icon!(
    Users,
    "M16 21v-2a4 4 0 0 0-4-4H6a4 4 0 0 0-4 4v2",
    "M9 11a4 4 0 1 0 0-8 4 4 0 0 0 0 8z",
    "M22 21v-2a4 4 0 0 0-3-3.87",
    "M16 3.13a4 4 0 0 1 0 7.75"
);
icon!(
    UserPlus,
    "M16 21v-2a4 4 0 0 0-4-4H6a4 4 0 0 0-4 4v2",
    "M9 11a4 4 0 1 0 0-8 4 4 0 0 0 0 8z",
    "M19 8v6",
    "M22 11h-6"
);
icon!(
    Wallet,
    "M19 7V4a1 1 0 0 0-1-1H5a2 2 0 0 0 0 4h15a1 1 0 0 1 1 1v4h-3a2 2 0 0 0 0 4h3a1 1 0 0 0 1-1v-2a1 1 0 0 0-1-1",
    "M3 5v14a2 2 0 0 0 2 2h15a1 1 0 0 0 1-1v-4"
);
icon!(Calendar, "M8 2v4", "M16 2v4", "M3 10h18", "M5 4h14a2 2 0 0 1 2 2v14a2 2 0 0 1-2 2H5a2 2 0 0 1-2-2V6a2 2 0 0 1 2-2z");
icon!(DollarSign, "M12 2v20", "M17 5H9.5a3.5 3.5 0 0 0 0 7h5a3.5 3.5 0 0 1 0 7H6");
icon!(ShieldCheck, "M20 13c0 5-3.5 7.5-7.66 8.95a1 1 0 0 1-.67-.01C7.5 20.5 4 18 4 13V6a1 1 0 0 1 1-1c2 0 4.5-1.2 6.24-2.72a1.17 1.17 0 0 1 1.52 0C14.51 3.81 17 5 19 5a1 1 0 0 1 1 1z", "m9 12 2 2 4-4");
icon!(Upload, "M21 15v4a2 2 0 0 1-2 2H5a2 2 0 0 1-2-2v-4", "m17 8-5-5-5 5", "M12 3v12");
icon!(Download, "M21 15v4a2 2 0 0 1-2 2H5a2 2 0 0 1-2-2v-4", "m7 10 5 5 5-5", "M12 15V3");
icon!(BarChart, "M3 3v18h18", "M18 17V9", "M13 17V5", "M8 17v-3");
icon!(CreditCard, "M4 5h16a2 2 0 0 1 2 2v10a2 2 0 0 1-2 2H4a2 2 0 0 1-2-2V7a2 2 0 0 1 2-2z", "M2 10h20");
icon!(LogOut, "M9 21H5a2 2 0 0 1-2-2V5a2 2 0 0 1 2-2h4", "m16 17 5-5-5-5", "M21 12H9");
icon!(Search, "M11 19a8 8 0 1 0 0-16 8 8 0 0 0 0 16z", "m21 21-4.3-4.3");
icon!(Sun, "M12 16a4 4 0 1 0 0-8 4 4 0 0 0 0 8z", "M12 2v2", "M12 20v2", "m4.93 4.93 1.41 1.41", "m17.66 17.66 1.41 1.41", "M2 12h2", "M20 12h2", "m6.34 17.66-1.41 1.41", "m19.07 4.93-1.41 1.41");
icon!(Moon, "M12 3a6 6 0 0 0 9 9 9 9 0 1 1-9-9z");
icon!(Plus, "M5 12h14", "M12 5v14");
icon!(Trash2, "M3 6h18", "M19 6v14c0 1-1 2-2 2H7c-1 0-2-1-2-2V6", "M8 6V4c0-1 1-2 2-2h4c1 0 2 1 2 2v2", "M10 11v6", "M14 11v6");
icon!(Pencil, "M21.17 6.81a1 1 0 0 0-3.99-3.99L3.84 16.17a2 2 0 0 0-.5.83l-1.32 4.35a.5.5 0 0 0 .62.62l4.35-1.32a2 2 0 0 0 .83-.5z", "m15 5 4 4");
icon!(RefreshCw, "M3 12a9 9 0 0 1 9-9 9.75 9.75 0 0 1 6.74 2.74L21 8", "M21 3v5h-5", "M21 12a9 9 0 0 1-9 9 9.75 9.75 0 0 1-6.74-2.74L3 16", "M8 16H3v5");
icon!(Check, "M20 6 9 17l-5-5");
icon!(XMark, "M18 6 6 18", "m6 6 12 12");
icon!(Phone, "M22 16.92v3a2 2 0 0 1-2.18 2 19.79 19.79 0 0 1-8.63-3.07 19.5 19.5 0 0 1-6-6 19.79 19.79 0 0 1-3.07-8.67A2 2 0 0 1 4.11 2h3a2 2 0 0 1 2 1.72 12.84 12.84 0 0 0 .7 2.81 2 2 0 0 1-.45 2.11L8.09 9.91a16 16 0 0 0 6 6l1.27-1.27a2 2 0 0 1 2.11-.45 12.84 12.84 0 0 0 2.81.7A2 2 0 0 1 22 16.92z");
icon!(ArrowUpRight, "M7 7h10v10", "M7 17 17 7");
icon!(ArrowDownLeft, "M17 7 7 17", "M17 17H7V7");
icon!(FileText, "M15 2H6a2 2 0 0 0-2 2v16a2 2 0 0 0 2 2h12a2 2 0 0 0 2-2V7z", "M14 2v4a2 2 0 0 0 2 2h4", "M16 13H8", "M16 17H8", "M10 9H8");

/// 按名称渲染导航图标，名称来自共享的导航表
#[component]
pub fn NavIcon(name: &'static str) -> impl IntoView {
    match name {
        "dashboard" => view! { <LayoutDashboard attr:class="h-5 w-5" /> }.into_any(),
        "users" => view! { <Users attr:class="h-5 w-5" /> }.into_any(),
        "user-plus" => view! { <UserPlus attr:class="h-5 w-5" /> }.into_any(),
        "wallet" => view! { <Wallet attr:class="h-5 w-5" /> }.into_any(),
        "calendar" => view! { <Calendar attr:class="h-5 w-5" /> }.into_any(),
        "dollar" => view! { <DollarSign attr:class="h-5 w-5" /> }.into_any(),
        "shield" => view! { <ShieldCheck attr:class="h-5 w-5" /> }.into_any(),
        "upload" => view! { <Upload attr:class="h-5 w-5" /> }.into_any(),
        "chart" => view! { <BarChart attr:class="h-5 w-5" /> }.into_any(),
        "card" => view! { <CreditCard attr:class="h-5 w-5" /> }.into_any(),
        _ => view! { <FileText attr:class="h-5 w-5" /> }.into_any(),
    }
}
