//! Built-in example schedule, used to reset an editor to a known-good document

/// Example import document covering one-off and recurring services
pub const EXAMPLE_SCHEDULE_JSON: &str = r#"{
  "timezone": "America/Chicago",
  "events": [
    {
      "id": "walkthrough-riverside-dental",
      "title": "Site walkthrough - Riverside Dental",
      "start": "2026-01-20T10:00:00-06:00",
      "end": "2026-01-20T10:30:00-06:00",
      "location": "418 Riverside Dr, Suite 200",
      "description": "Initial walkthrough and quote for nightly cleaning.",
      "metadata": { "client": "Riverside Dental", "estimator": "Maria" }
    },
    {
      "id": "post-construction-oak-plaza",
      "title": "Post-construction cleanup - Oak Plaza",
      "start": "2026-01-24",
      "allDay": true,
      "location": "1200 Oak Plaza"
    }
  ],
  "recurring": [
    {
      "id": "nightly-first-national",
      "title": "Office cleaning - First National",
      "rrule": "FREQ=WEEKLY;BYDAY=MO,WE,FR",
      "dtstart": "2026-01-05T18:00:00-06:00",
      "durationMinutes": 120,
      "exdate": ["2026-01-19T18:00:00-06:00"],
      "location": "77 Main St",
      "metadata": { "crew": ["A", "C"], "squareFeet": 12000 }
    },
    {
      "id": "floor-care-grace-church",
      "title": "Floor strip and wax - Grace Church",
      "rrule": "FREQ=MONTHLY;INTERVAL=3;BYMONTHDAY=1;COUNT=4",
      "dtstart": "2026-02-01T07:00:00-06:00",
      "durationMinutes": 240,
      "description": "Quarterly deep floor care in the fellowship hall."
    }
  ]
}
"#;

/// The example schedule as owned text
pub fn example_schedule_text() -> String {
    EXAMPLE_SCHEDULE_JSON.to_string()
}
