pub mod certificates;
pub mod competitions;
pub mod rounds;
