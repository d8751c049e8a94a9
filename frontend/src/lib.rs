pub mod components;
pub mod logging;

pub use components::input_numeric::InputNumeric;
pub use shared::{Constraints, Decimal, Direction, RepeatTiming, SpinnerOptions};

/// Install the panic hook and the console logger.
///
/// Call once from the application entry point; later calls only adjust the
/// log level.
pub fn init(level: log::LevelFilter) {
    console_error_panic_hook::set_once();
    if logging::init_with_level(level).is_err() {
        log::set_max_level(level);
    }
}
