// Live watch mode: refresh loop, view projection and terminal dashboard
pub mod actions;
pub mod dashboard;
pub mod events;
pub mod file_watcher;
pub mod scheduler;
pub mod session;
pub mod view;
pub mod watch_mode;

pub use dashboard::{Dashboard, DashboardState};
pub use events::{DashboardMessage, SourceEvent, UserCommand};
pub use file_watcher::FileWatcher;
pub use scheduler::{RefreshScheduler, SchedulerState, TickDecision};
pub use session::{RefreshSession, TickOutcome};
pub use view::{render, Notice, ProviderCard, RenderOptions, View, ViewFrame, ViewModel, ViewSurface, ViewUpdate};
pub use watch_mode::{RefreshLoop, WatchMode, WatchOptions};
