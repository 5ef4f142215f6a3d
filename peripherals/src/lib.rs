pub mod gpio_sim;
pub mod input_sim;
pub mod pins;
