pub mod month_init;
pub mod navigation;
pub mod propagation;
