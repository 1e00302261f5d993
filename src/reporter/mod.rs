pub mod csv;
pub mod html;
pub mod json;
pub mod terminal;

use crate::report::ScanReport;

pub trait Reporter {
    fn report(&self, report: &ScanReport) -> String;
}
