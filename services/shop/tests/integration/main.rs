mod address_test;
mod helpers;
mod order_test;
mod product_test;
mod router_test;
mod scenario_test;
