use csv::StringRecord;

/// One issued parking ticket.
///
/// The typed fields are what the pipeline groups and joins on. `fields` is the
/// row exactly as read, so filtered output can be written back unchanged,
/// including any columns beyond the required ones.
#[derive(Debug, Clone)]
pub struct ViolationRecord {
    pub location: String,
    pub amount: f64,
    pub lat: f64,
    pub lon: f64,
    pub dayofweek: String,
    pub hourofday: String,
    pub fields: StringRecord,
}

/// Parsed input: the header row plus every record in input order.
#[derive(Debug, Clone, Default)]
pub struct ViolationTable {
    pub headers: StringRecord,
    pub records: Vec<ViolationRecord>,
}

impl ViolationTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
