pub mod builder;
pub mod coordinator;
pub mod exchange;

pub use builder::CoordinatorBuilder;
pub use coordinator::{SendOutcome, SessionCoordinator, SessionState};
pub use exchange::{ExchangeController, ExchangeOutcome, ExchangeState, PendingExchange};

// Cancellation tokens are accepted by `send_message_with_cancel` and `ExchangeController::run`
pub use tokio_util::sync::CancellationToken;
