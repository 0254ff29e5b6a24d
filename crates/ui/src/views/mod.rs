mod state;
mod text;

pub use state::ViewError;
