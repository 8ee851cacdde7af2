pub mod advice;
pub mod aqi;
pub mod geocode;
pub mod traffic;
