use chrono::{Duration, NaiveDate, NaiveTime};
use proptest::prelude::*;
use sheetcell_common::{CellValue, coerce_numeric, datetime_to_serial, locale, serial_to_datetime};

fn base() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(1900, 1, 1)
        .unwrap()
        .and_time(NaiveTime::MIN)
}

proptest! {
    // Serial encoding preserves the ordering of instants from 1900 on.
    #[test]
    fn serial_order_matches_instant_order(a in 0i64..4_000_000_000, b in 0i64..4_000_000_000) {
        let da = base() + Duration::seconds(a);
        let db = base() + Duration::seconds(b);
        let (sa, sb) = (datetime_to_serial(&da), datetime_to_serial(&db));
        prop_assert_eq!(da.cmp(&db), sa.partial_cmp(&sb).unwrap());
    }

    #[test]
    fn whole_second_instants_survive_decoding(secs in 0i64..4_000_000_000) {
        let dt = base() + Duration::seconds(secs);
        prop_assert_eq!(serial_to_datetime(datetime_to_serial(&dt)), Some(dt));
    }
}

#[test]
fn date_cells_coerce_to_their_serial() {
    let dt = NaiveDate::from_ymd_opt(2000, 1, 1)
        .unwrap()
        .and_hms_opt(18, 0, 0)
        .unwrap();
    assert_eq!(
        coerce_numeric(&CellValue::DateTime(dt), &locale::EN_US),
        Some(36526.75)
    );
}
