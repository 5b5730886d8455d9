//! Curated word lists for the list-backed transformers (§4.4.2: "All
//! list-backed transformers load their corpora once at construction").
//!
//! These are small `const` arrays baked into the binary rather than
//! runtime-loaded files, so there is no install-time data directory to
//! manage.

pub const GIVEN_NAMES: &[&str] = &[
    "James", "Mary", "Robert", "Patricia", "John", "Jennifer", "Michael", "Linda", "David",
    "Elizabeth", "William", "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas", "Sarah",
    "Charles", "Karen", "Christopher", "Lisa", "Daniel", "Nancy", "Matthew", "Betty", "Anthony",
    "Margaret", "Mark", "Sandra",
];

pub const SURNAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson", "White", "Harris", "Sanchez",
    "Clark", "Ramirez", "Lewis", "Robinson",
];

pub const CITIES: &[&str] = &[
    "Springfield", "Riverside", "Franklin", "Clinton", "Greenville", "Bristol", "Salem",
    "Fairview", "Madison", "Georgetown", "Arlington", "Ashland", "Burlington", "Centerville",
    "Dayton", "Lexington", "Manchester", "Oakland", "Princeton", "Troy",
];

pub const STREETS: &[&str] = &[
    "Main St", "Oak Ave", "Maple St", "Cedar Ln", "Elm St", "View Dr", "Washington Ave",
    "Park Ave", "Lake St", "Hill Rd", "Sunset Blvd", "Church St", "Spring St", "River Rd",
    "Highland Ave", "Mill St", "2nd St", "3rd Ave", "Ridge Rd", "Forest Dr",
];

pub const US_STATES: &[&str] = &[
    "Alabama", "Alaska", "Arizona", "Arkansas", "California", "Colorado", "Connecticut",
    "Delaware", "Florida", "Georgia", "Hawaii", "Idaho", "Illinois", "Indiana", "Iowa", "Kansas",
    "Kentucky", "Louisiana", "Maine", "Maryland",
];

pub const US_STATE_ABBR: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD",
];

/// `(zip, state-abbr)` pairs spanning several 3-digit prefixes, enough to
/// exercise both the matched-prefix and fallback paths of `Geozip`.
pub const ZIPS: &[&str] = &[
    "10001", "10002", "10023", "10028", "20001", "20002", "20037", "30301", "30308", "30318",
    "60601", "60614", "60637", "94102", "94110", "94123", "98101", "98109", "98115", "02108",
];
