//! 文件投递
//!
//! CSV 内容由 `maisha_shared::csv` 纯函数生成，这里只负责把字节交给用户。

use maisha_shared::csv::{Record, records_to_csv};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

pub const CSV_MIME: &str = "text/csv";

pub trait FileSink {
    fn deliver(&self, filename: &str, content: &str, mime: &str) -> Result<(), String>;
}

/// 通过临时 `<a download>` 触发浏览器下载
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserDownload;

impl FileSink for BrowserDownload {
    fn deliver(&self, filename: &str, content: &str, mime: &str) -> Result<(), String> {
        let js_err = |e: JsValue| format!("{:?}", e);

        let parts = js_sys::Array::of1(&JsValue::from_str(content));
        let options = web_sys::BlobPropertyBag::new();
        options.set_type(mime);
        let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &options)
            .map_err(js_err)?;
        let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(js_err)?;

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| "document is unavailable".to_string())?;
        let anchor: web_sys::HtmlAnchorElement = document
            .create_element("a")
            .map_err(js_err)?
            .dyn_into()
            .map_err(|_| "anchor cast failed".to_string())?;
        anchor.set_href(&url);
        anchor.set_download(filename);
        anchor.click();

        web_sys::Url::revoke_object_url(&url).map_err(js_err)?;
        Ok(())
    }
}

/// 导出记录为 CSV 文件
pub fn export_csv(sink: &impl FileSink, filename: &str, records: &[Record]) -> Result<(), String> {
    sink.deliver(filename, &records_to_csv(records), CSV_MIME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingSink {
        files: RefCell<Vec<(String, String, String)>>,
    }

    impl FileSink for RecordingSink {
        fn deliver(&self, filename: &str, content: &str, mime: &str) -> Result<(), String> {
            self.files
                .borrow_mut()
                .push((filename.to_string(), content.to_string(), mime.to_string()));
            Ok(())
        }
    }

    #[test]
    fn export_passes_generated_csv_to_sink() {
        let sink = RecordingSink::default();
        let records = vec![vec![
            ("Full Name".to_string(), "Jean Mugisha".to_string()),
            ("Phone".to_string(), "250788".to_string()),
        ]];
        export_csv(&sink, "members_report.csv", &records).unwrap();

        let files = sink.files.borrow();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].0, "members_report.csv");
        assert_eq!(files[0].1, "Full Name,Phone\nJean Mugisha,250788");
        assert_eq!(files[0].2, CSV_MIME);
    }
}
