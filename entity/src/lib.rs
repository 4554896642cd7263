//! # Entity 模块
//!
//! 包含所有 Sea-ORM 实体定义

pub mod users;
pub mod articles;
pub mod posts;
pub mod comments;
pub mod likes;
pub mod collections;
pub mod simulation_accounts;
pub mod positions;
pub mod transactions;

pub use users::Entity as Users;
pub use articles::Entity as Articles;
pub use posts::Entity as Posts;
pub use comments::Entity as Comments;
pub use likes::Entity as Likes;
pub use collections::Entity as Collections;
pub use simulation_accounts::Entity as SimulationAccounts;
pub use positions::Entity as Positions;
pub use transactions::Entity as Transactions;

#[cfg(test)]
mod tests;
