pub mod campaigns;
pub mod growth;
pub mod system;
