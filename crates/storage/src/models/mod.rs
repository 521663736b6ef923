pub mod certificate;
pub mod city;
pub mod competition;
pub mod participation;
pub mod result;
pub mod round;

pub use certificate::{Certificate, certificate_status};
pub use city::{City, CompetitionCity};
pub use competition::{Competition, competition_status};
pub use participation::{Participation, participation_source};
pub use result::{CompetitionResult, result_status};
pub use round::{Round, RoundParticipation, RoundScore, qualified_by, round_status};
