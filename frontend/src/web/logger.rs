//! 日志输出
//!
//! 为 `log` 门面提供浏览器控制台后端；非 WASM 目标（测试）输出到 stderr。

use log::{LevelFilter, Log, Metadata, Record};

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("[{}] {}", record.target(), record.args());

        #[cfg(target_arch = "wasm32")]
        {
            use log::Level;
            let msg = wasm_bindgen::JsValue::from_str(&line);
            match record.level() {
                Level::Error => web_sys::console::error_1(&msg),
                Level::Warn => web_sys::console::warn_1(&msg),
                Level::Info => web_sys::console::info_1(&msg),
                Level::Debug | Level::Trace => web_sys::console::debug_1(&msg),
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            eprintln!("{:<5} {}", record.level(), line);
        }
    }

    fn flush(&self) {}
}

/// 安装控制台日志，重复调用无副作用
pub fn init(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}
