pub mod address;
pub mod auth;
pub mod cart;
pub mod category;
pub mod extract;
pub mod health;
pub mod middleware;
pub mod order;
pub mod product;
pub mod review;
pub mod user;
