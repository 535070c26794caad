//! 应用回调槽位
//!
//! 宿主应用在首次使用前各设置一次，未设置的槽位调用时什么都不做。

use std::sync::{Arc, OnceLock};

use tracing::debug;

use super::record::NotificationRecord;

/// 无参回调
pub type UnitHook = Arc<dyn Fn() + Send + Sync>;

/// 带记录的回调
pub type RecordHook = Arc<dyn Fn(&NotificationRecord) + Send + Sync>;

/// 四个应用回调
#[derive(Default)]
pub struct AppCallbacks {
    permission_allowed: OnceLock<UnitHook>,
    tap: OnceLock<RecordHook>,
    swipe: OnceLock<RecordHook>,
    show_more: OnceLock<RecordHook>,
}

impl AppCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 用户授权通知后触发。已设置过时返回 `false` 并保留原回调。
    pub fn set_on_permission_allowed(&self, hook: impl Fn() + Send + Sync + 'static) -> bool {
        self.permission_allowed.set(Arc::new(hook)).is_ok()
    }

    /// 后台收到通知并带回应用时触发
    pub fn set_on_tap(&self, hook: impl Fn(&NotificationRecord) + Send + Sync + 'static) -> bool {
        self.tap.set(Arc::new(hook)).is_ok()
    }

    /// 用户触发通知默认动作时触发
    pub fn set_on_swipe(&self, hook: impl Fn(&NotificationRecord) + Send + Sync + 'static) -> bool {
        self.swipe.set(Arc::new(hook)).is_ok()
    }

    /// 用户点击 "显示更多" 按钮时触发
    pub fn set_on_show_more(
        &self,
        hook: impl Fn(&NotificationRecord) + Send + Sync + 'static,
    ) -> bool {
        self.show_more.set(Arc::new(hook)).is_ok()
    }

    pub fn permission_allowed(&self) {
        match self.permission_allowed.get() {
            Some(hook) => hook(),
            None => debug!(hook = "permission_allowed", "Hook not set, skipping"),
        }
    }

    pub fn tap(&self, record: &NotificationRecord) {
        Self::fire(&self.tap, "tap", record);
    }

    pub fn swipe(&self, record: &NotificationRecord) {
        Self::fire(&self.swipe, "swipe", record);
    }

    pub fn show_more(&self, record: &NotificationRecord) {
        Self::fire(&self.show_more, "show_more", record);
    }

    fn fire(slot: &OnceLock<RecordHook>, name: &str, record: &NotificationRecord) {
        match slot.get() {
            Some(hook) => hook(record),
            None => debug!(hook = name, "Hook not set, skipping"),
        }
    }
}

impl std::fmt::Debug for AppCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppCallbacks")
            .field("permission_allowed", &self.permission_allowed.get().is_some())
            .field("tap", &self.tap.get().is_some())
            .field("swipe", &self.swipe.get().is_some())
            .field("show_more", &self.show_more.get().is_some())
            .finish()
    }
}
