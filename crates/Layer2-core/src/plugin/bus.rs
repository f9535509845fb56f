//! Notification Bus - 알림 broadcast 및 메시지 relay
//!
//! - `notify` / `broadcast`: 수명주기 알림. 플러그인마다 복사본을 전달한다.
//! - `relay` / `relay_to`: 원시 (message, wparam, lparam) 전달.
//!
//! Shutdown 이 한 번 broadcast 되면 이후 broadcast 는 모두 무시된다.

use tracing::{debug, info};

use super::events::{HostMessage, Notification};
use super::fault::{CallOutcome, CallSite};
use super::manager::PluginManager;

impl PluginManager {
    // ========================================================================
    // 알림
    // ========================================================================

    /// 플러그인 하나에 알림 전달
    pub fn notify(&mut self, index: usize, notification: &Notification) -> CallOutcome {
        let site = CallSite::Notify {
            code: notification.code.code(),
            hwnd_from: notification.hwnd_from,
            id_from: notification.id_from,
        };
        let mut copy = notification.clone();
        self.call_plugin(index, site, |module| module.notify(&mut copy))
    }

    /// 모든 플러그인에 알림 전달
    ///
    /// 반환값: 알림을 전달받은 플러그인 수 (장애가 난 플러그인 포함)
    pub fn broadcast(&mut self, notification: &Notification) -> usize {
        if self.no_more_notification {
            debug!(
                "Notification {} dropped after shutdown",
                notification.code
            );
            return 0;
        }
        if notification.is_shutdown() {
            info!("Shutdown broadcast, closing notification bus");
            self.no_more_notification = true;
        }

        (0..self.plugins.len())
            .filter(|&index| self.notify(index, notification) != CallOutcome::Skipped)
            .count()
    }

    // ========================================================================
    // Relay
    // ========================================================================

    /// 로드된 모든 플러그인에 원시 메시지 전달
    pub fn relay(&mut self, message: &HostMessage) -> usize {
        let site = CallSite::RelayAll {
            message: message.message,
            wparam: message.wparam,
            lparam: message.lparam,
        };
        (0..self.plugins.len())
            .filter(|&index| {
                self.call_plugin(index, site.clone(), |module| {
                    module.dispatch_message(message).map(|_| ())
                }) != CallOutcome::Skipped
            })
            .count()
    }

    /// 이름이 일치하는 첫 번째 로드된 플러그인에 원시 메시지 전달
    ///
    /// 반환값: 일치하는 플러그인을 찾았는지
    pub fn relay_to(&mut self, plugin_name: &str, message: &HostMessage) -> bool {
        if plugin_name.is_empty() {
            return false;
        }
        let target = self
            .plugins
            .iter()
            .position(|plugin| !plugin.is_inert() && plugin.matches_name(plugin_name));
        let Some(index) = target else {
            debug!("relay_to: no loaded plugin named '{}'", plugin_name);
            return false;
        };

        let site = CallSite::RelayTo {
            message: message.message,
            wparam: message.wparam,
            lparam: message.lparam,
        };
        self.call_plugin(index, site, |module| {
            module.dispatch_message(message).map(|_| ())
        });
        true
    }
}
