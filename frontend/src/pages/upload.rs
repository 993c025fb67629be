use leptos::prelude::*;
use leptos::task::spawn_local;
use maisha_shared::csv::{failed_numbers_csv, is_csv_file, parse_phone_list, template_csv};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::api::{ImportSummary, use_api};
use crate::auth::use_auth;
use crate::components::icons::{Check, Download, Upload, XMark};
use crate::components::toast::use_notifier;
use crate::components::widgets::{GroupPicker, GroupSelection, NoGroup, PageHeader};
use crate::web::download::{BrowserDownload, CSV_MIME, FileSink};

const TEMPLATE_FILENAME: &str = "member_upload_template.csv";
const FAILED_FILENAME: &str = "failed_numbers.csv";

/// 读取 `<input type="file">` 选中的第一个文件：(文件名, MIME, 内容)
async fn read_selected_file(input: web_sys::HtmlInputElement) -> Result<Option<(String, String, String)>, String> {
    let Some(file) = input.files().and_then(|files| files.get(0)) else {
        return Ok(None);
    };
    let (name, mime) = (file.name(), file.type_());
    if !is_csv_file(&name, &mime) {
        return Err("Please upload a CSV file. Excel (.xlsx/.xls) is not supported in-browser.".to_string());
    }
    let text = JsFuture::from(file.text())
        .await
        .map_err(|e| format!("{:?}", e))?
        .as_string()
        .unwrap_or_default();
    Ok(Some((name, mime, text)))
}

fn summary_message(summary: &ImportSummary) -> String {
    format!(
        "Successfully added {} members. {} failed.",
        summary.success,
        summary.failed.len()
    )
}

#[component]
pub fn UploadPage() -> impl IntoView {
    let auth = use_auth();
    let api = use_api();
    let notifier = use_notifier();
    let selection = GroupSelection::new(auth.scope());

    // (文件名, 内容)
    let file = RwSignal::new(Option::<(String, String)>::None);
    let uploading = RwSignal::new(false);
    let result = RwSignal::new(Option::<ImportSummary>::None);

    let on_file_change = move |ev: leptos::ev::Event| {
        let Some(input) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        else {
            return;
        };
        spawn_local(async move {
            match read_selected_file(input).await {
                Ok(Some((name, _, text))) => {
                    log::info!("[Upload] selected {} ({} bytes)", name, text.len());
                    file.set(Some((name, text)));
                    result.set(None);
                }
                Ok(None) => file.set(None),
                Err(msg) => {
                    file.set(None);
                    notifier.error("Unsupported File", msg);
                }
            }
        });
    };

    let on_upload = move || {
        let (Some(group_id), Some((_, text))) = (selection.group_id(), file.get()) else {
            notifier.error("Missing Information", "Please select a group and upload a file");
            return;
        };
        let phones = parse_phone_list(&text);
        if phones.is_empty() {
            notifier.error("Empty File", "No phone numbers were found in the file");
            return;
        }
        uploading.set(true);
        let api = api.clone();
        spawn_local(async move {
            let summary = api.import_members(group_id, &phones).await;
            notifier.success("Upload Complete", summary_message(&summary));
            result.set(Some(summary));
            uploading.set(false);
        });
    };
    let on_upload = StoredValue::new(on_upload);

    let deliver = move |filename: &'static str, content: String| {
        if let Err(e) = BrowserDownload.deliver(filename, &content, CSV_MIME) {
            log::error!("download of {} failed: {}", filename, e);
            notifier.error("Download failed", e);
        }
    };

    let download_failed = move |_| {
        if let Some(summary) = result.get() {
            deliver(FAILED_FILENAME, failed_numbers_csv(&summary.failed));
        }
    };

    view! {
        <div class="space-y-6">
            <PageHeader title="Excel Upload" subtitle="Bulk import members from a list of phone numbers">
                <button class="btn btn-outline gap-2" on:click=move |_| deliver(TEMPLATE_FILENAME, template_csv())>
                    <Download attr:class="h-4 w-4" /> "Template"
                </button>
            </PageHeader>

            <Show
                when=move || selection.group_id().is_some() || selection.scope.needs_group_picker()
                fallback=|| view! { <NoGroup /> }
            >
                <div class="card bg-base-100 shadow max-w-2xl">
                    <div class="card-body space-y-4">
                        <div class="form-control">
                            <label class="label"><span class="label-text">"Group"</span></label>
                            <Show
                                when=move || selection.scope.needs_group_picker()
                                fallback=move || view! {
                                    <p class="font-semibold">
                                        {auth.user().get_untracked().and_then(|u| u.group_label()).unwrap_or_else(|| "Your Group".to_string())}
                                    </p>
                                }
                            >
                                <GroupPicker selection=selection />
                            </Show>
                        </div>
                        <div class="form-control">
                            <label class="label"><span class="label-text">"CSV File"</span></label>
                            <input
                                type="file"
                                accept=".csv,text/csv"
                                class="file-input file-input-bordered w-full"
                                on:change=on_file_change
                            />
                            <label class="label">
                                <span class="label-text-alt">"First column: phone numbers. A header row containing \"phone\" is skipped."</span>
                            </label>
                        </div>
                        <Show when=move || file.with(Option::is_some)>
                            <p class="text-sm">
                                "Selected: " {move || file.with(|f| f.as_ref().map(|(n, _)| n.clone()).unwrap_or_default())}
                                " · " {move || file.with(|f| f.as_ref().map(|(_, t)| parse_phone_list(t).len()).unwrap_or(0))} " numbers"
                            </p>
                        </Show>
                        <button
                            class="btn btn-primary gap-2"
                            on:click=move |_| on_upload.with_value(|upload| upload())
                            disabled=move || uploading.get() || file.with(Option::is_none)
                        >
                            {move || if uploading.get() {
                                view! { <span class="loading loading-spinner"></span> "Importing..." }.into_any()
                            } else {
                                view! { <Upload attr:class="h-4 w-4" /> "Upload and Import" }.into_any()
                            }}
                        </button>
                    </div>
                </div>
            </Show>

            {move || result.get().map(|summary| {
                let failed = summary.failed.clone();
                let failed_count = failed.len();
                let has_failures = failed_count > 0;
                view! {
                    <div class="card bg-base-100 shadow max-w-2xl">
                        <div class="card-body space-y-3">
                            <h3 class="card-title">"Import Result"</h3>
                            <div class="flex gap-6">
                                <div class="flex items-center gap-2 text-success">
                                    <Check attr:class="h-5 w-5" /> {summary.success} " added"
                                </div>
                                <div class="flex items-center gap-2 text-error">
                                    <XMark attr:class="h-5 w-5" /> {failed_count} " failed"
                                </div>
                            </div>
                            <Show when=move || has_failures>
                                <ul class="text-sm font-mono max-h-40 overflow-y-auto">
                                    {failed.iter().map(|p| view! { <li>{p.clone()}</li> }).collect_view()}
                                </ul>
                                <button class="btn btn-outline btn-sm gap-2 w-fit" on:click=download_failed>
                                    <Download attr:class="h-4 w-4" /> "Download failed numbers"
                                </button>
                            </Show>
                        </div>
                    </div>
                }
            })}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_reports_counts() {
        let summary = ImportSummary {
            success: 2,
            failed: vec!["250788000333".to_string()],
        };
        assert_eq!(summary_message(&summary), "Successfully added 2 members. 1 failed.");
    }
}
