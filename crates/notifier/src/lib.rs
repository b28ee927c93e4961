pub mod channels;
pub mod email;
pub mod notifier;
pub mod report;
pub mod util;

pub use channels::{CustomWebhookChannel, FeishuChannel, PushoverChannel, TelegramChannel, WeChatChannel};
pub use email::EmailChannel;
pub use notifier::{DispatchResult, Notifier, NotifierConfig};
pub use report::render_report;
