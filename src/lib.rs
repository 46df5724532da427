pub mod clock;
pub mod destroyable;
pub mod error;
pub mod events;
pub mod game;
pub mod model;
pub mod storage;
