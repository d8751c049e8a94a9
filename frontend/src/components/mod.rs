pub mod input_numeric;
