//! 本地存储封装模块
//!
//! `KeyValueStore` 让会话与 API 客户端不直接依赖 `window.localStorage`，
//! 测试中可替换为内存实现。

/// 字符串键值存储
pub trait KeyValueStore {
    /// 获取存储的字符串值
    ///
    /// 键不存在或发生错误时返回 `None`
    fn get(&self, key: &str) -> Option<String>;

    /// 设置存储值，返回操作是否成功
    fn set(&self, key: &str, value: &str) -> bool;

    /// 删除键值对，返回操作是否成功
    fn delete(&self, key: &str) -> bool;
}

/// 浏览器 LocalStorage
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
    /// 获取 LocalStorage 实例
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) -> bool {
        Self::storage()
            .and_then(|s| s.set_item(key, value).ok())
            .is_some()
    }

    fn delete(&self, key: &str) -> bool {
        Self::storage()
            .and_then(|s| s.remove_item(key).ok())
            .is_some()
    }
}

// =========================================================
// 测试工具: MemoryStorage
// =========================================================

/// 内存存储，克隆后共享同一份数据
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: std::rc::Rc<std::cell::RefCell<std::collections::HashMap<String, String>>>,
}

#[cfg(test)]
impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> std::collections::HashMap<String, String> {
        self.items.borrow().clone()
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        true
    }

    fn delete(&self, key: &str) -> bool {
        self.items.borrow_mut().remove(key);
        true
    }
}
