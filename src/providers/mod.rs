pub mod functions;

pub use functions::FunctionsProvider;
