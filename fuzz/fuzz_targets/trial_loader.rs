#![no_main]

use benchreport::table::TrialTable;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Loading and filtering must fail cleanly, never panic
    if let Ok(table) = TrialTable::from_reader(data, "fuzz.csv") {
        let names: Vec<String> = table.column_names().iter().map(|s| s.to_string()).collect();
        if let Some(first) = names.first() {
            let _ = table.count_sentinels(first);
            if let Ok(filtered) = table.filter_failed(first) {
                let _ = filtered.coerce(&names, &[]);
            }
        }
    }
});
