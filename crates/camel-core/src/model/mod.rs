pub mod color;
pub mod dice;
pub mod marker;
pub mod ticket;
pub mod track;
