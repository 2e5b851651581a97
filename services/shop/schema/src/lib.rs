//! sea-orm entities for the shop database. One module per table.

pub mod addresses;
pub mod cart_items;
pub mod carts;
pub mod categories;
pub mod images;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod users;
