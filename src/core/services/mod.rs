pub mod account_service;
pub mod budget_service;
pub mod category_service;
pub mod plan_service;
pub mod transaction_service;
pub mod user_service;

pub use account_service::AccountService;
pub use budget_service::{BudgetProgress, BudgetService};
pub use category_service::CategoryService;
pub use plan_service::PlanService;
pub use transaction_service::TransactionService;
pub use user_service::UserService;
