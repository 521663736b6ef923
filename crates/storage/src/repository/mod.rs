pub mod certificate;
pub mod city;
pub mod competition;
pub mod participation;
pub mod round;
