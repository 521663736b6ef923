pub mod certificate_lifecycle;
pub mod city_completion;
pub mod promotion;
pub mod ranking;
pub mod score_ingestion;
pub mod winners;
