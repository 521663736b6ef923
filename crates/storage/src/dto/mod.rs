pub mod certificate;
pub mod city;
pub mod city_status;
pub mod competition;
pub mod participation;
pub mod round;
pub mod score;
pub mod winners;
