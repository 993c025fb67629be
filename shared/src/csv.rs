//! CSV 导出与导入
//!
//! 导出是纯函数：表头为字段名顺序，数据行为字段值按逗号直接拼接（不转义）。
//! 投递（浏览器下载）由前端的 `FileSink` 负责。

/// 表格记录：有序的 (字段名, 值) 列表
pub type Record = Vec<(String, String)>;

pub const FAILED_NUMBERS_HEADER: &str = "Phone Numbers (Failed)";
pub const TEMPLATE_HEADER: &str = "Phone Numbers";
pub const TEMPLATE_SAMPLE_PHONES: [&str; 3] = ["0712345678", "0723456789", "0734567890"];

/// 将记录转换为 CSV 文本
///
/// 表头取自第一条记录；没有记录时输出空表头行。
pub fn records_to_csv(records: &[Record]) -> String {
    let header = records
        .first()
        .map(|r| {
            r.iter()
                .map(|(k, _)| k.as_str())
                .collect::<Vec<_>>()
                .join(",")
        })
        .unwrap_or_default();

    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(header);
    for record in records {
        lines.push(
            record
                .iter()
                .map(|(_, v)| v.as_str())
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    lines.join("\n")
}

/// 导入失败号码列表
pub fn failed_numbers_csv(phones: &[String]) -> String {
    std::iter::once(FAILED_NUMBERS_HEADER.to_string())
        .chain(phones.iter().cloned())
        .collect::<Vec<_>>()
        .join("\n")
}

/// 导入模板
pub fn template_csv() -> String {
    std::iter::once(TEMPLATE_HEADER)
        .chain(TEMPLATE_SAMPLE_PHONES)
        .collect::<Vec<_>>()
        .join("\n")
}

/// 解析导入文件中的电话号码
///
/// 每行取第一列（以 `,` `;` 或制表符分隔），去掉非数字字符后为空的丢弃。
/// 首行包含 "phone"（不区分大小写）时视为表头跳过。
pub fn parse_phone_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .filter(|(i, line)| !(*i == 0 && line.to_lowercase().contains("phone")))
        .filter_map(|(_, line)| {
            let cell = line.split([',', ';', '\t']).next().unwrap_or("").trim();
            let digits: String = cell.chars().filter(char::is_ascii_digit).collect();
            (!digits.is_empty()).then_some(digits)
        })
        .collect()
}

/// 转换为查询格式：去空白，本地号码前导 `0` 替换为 `250`
pub fn format_phone_for_lookup(phone: &str) -> String {
    let compact: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    match compact.strip_prefix('0') {
        Some(rest) => format!("250{}", rest),
        None => compact,
    }
}

/// 只接受 `.csv` 文件
pub fn is_csv_file(name: &str, mime: &str) -> bool {
    name.to_lowercase().ends_with(".csv") || mime == "text/csv"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn header_skipped_and_phones_kept() {
        let text = "Phone Numbers\n0712345678\n0723456789";
        assert_eq!(parse_phone_list(text), vec!["0712345678", "0723456789"]);
    }

    #[test]
    fn first_column_digits_only() {
        let text = "+250 788-111-222;Alice\r\n\r\n  \n(0733) 444 555\tBob\nname-only,123\nxyz";
        assert_eq!(
            parse_phone_list(text),
            vec!["250788111222", "0733444555"]
        );
    }

    #[test]
    fn header_only_detected_on_first_line() {
        let text = "0712345678\nphone 0799999999";
        assert_eq!(parse_phone_list(text), vec!["0712345678", "0799999999"]);
    }

    #[test]
    fn lookup_format() {
        assert_eq!(format_phone_for_lookup("0712 345 678"), "250712345678");
        assert_eq!(format_phone_for_lookup("250712345678"), "250712345678");
    }

    #[test]
    fn records_layout() {
        let records = vec![
            rec(&[("Group Name", "Alpha"), ("Members", "3")]),
            rec(&[("Group Name", "Beta"), ("Members", "0")]),
        ];
        assert_eq!(records_to_csv(&records), "Group Name,Members\nAlpha,3\nBeta,0");
        assert_eq!(records_to_csv(&[]), "");
    }

    #[test]
    fn generated_files() {
        assert_eq!(
            failed_numbers_csv(&["1".to_string(), "2".to_string()]),
            "Phone Numbers (Failed)\n1\n2"
        );
        assert_eq!(parse_phone_list(&template_csv()), TEMPLATE_SAMPLE_PHONES.to_vec());
    }

    #[test]
    fn csv_file_check() {
        assert!(is_csv_file("Members.CSV", ""));
        assert!(is_csv_file("upload", "text/csv"));
        assert!(!is_csv_file("members.xlsx", "application/vnd.ms-excel"));
    }
}
