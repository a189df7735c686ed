pub mod fcm;
pub mod health;
pub mod outcome;
pub mod profile;
pub mod webhook;
