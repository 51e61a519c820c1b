#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use chrono::TimeZone as _;

fn number(format: &str, value: impl Into<Number>) -> String {
    number_format(format).unwrap().format(value.into()).unwrap()
}

fn sample_date(kind: DateKind) -> DateValue {
    let instant = chrono::Utc
        .with_ymd_and_hms(2024, 3, 1, 13, 5, 9)
        .single()
        .unwrap();
    DateValue::new(instant, kind)
}

mod numbers {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_number_format_groups_and_keeps_three_fraction_digits() {
        assert_eq!(number("number", 1_234_567_i64), "1,234,567");
        assert_eq!(number("number", 1234.5678), "1,234.568");
        assert_eq!(number("number", 0.5), "0.5");
        assert_eq!(number("number", -42_i64), "-42");
    }

    #[test]
    fn fixed_fraction_digits() {
        assert_eq!(number("0.00", 3.14159), "3.14");
        assert_eq!(number("0.00", 2_i64), "2.00");
        assert_eq!(number("#,##0.#", 1234.56), "1,234.6");
    }

    #[test]
    fn minimum_integer_digits() {
        assert_eq!(number("000", 7_i64), "007");
        assert_eq!(number("#.##", 0.5), ".5");
        assert_eq!(number("#.##", 0_i64), "0");
    }

    #[test]
    fn rounds_half_even() {
        assert_eq!(number("0", 2.5), "2");
        assert_eq!(number("0", 3.5), "4");
    }

    #[test]
    fn negative_zero_has_no_sign() {
        assert_eq!(number("0.0", -0.01), "0.0");
    }

    #[test]
    fn percent_and_literal_affixes() {
        assert_eq!(number("percent", 0.25), "25%");
        assert_eq!(number("0.0' units'", 1.25), "1.2 units");
    }

    #[test]
    fn computer_format() {
        assert_eq!(number("c", 1_000_000_i64), "1000000");
        assert_eq!(number("computer", f64::INFINITY), "INF");
    }

    #[test]
    fn malformed_patterns_are_rejected() {
        assert!(matches!(
            number_format("abc"),
            Err(FormatError::MalformedPattern { .. })
        ));
        assert!(number_format("0.#0").is_err());
        assert!(number_format("'0.0").is_err());
        assert!(number_format("currency").is_err());
    }

    #[test]
    fn parse_reverses_grouping() {
        let format = number_format("#,##0.##").unwrap();
        assert_eq!(format.parse("1,234.5").unwrap(), Number::Float(1234.5));
        assert_eq!(format.parse("-12").unwrap(), Number::Int(-12));
        assert!(format.parse("twelve").is_err());
        let percent = number_format("percent").unwrap();
        assert_eq!(percent.parse("50%").unwrap(), Number::Float(0.5));
    }
}

mod dates {
    use super::*;
    use pretty_assertions::assert_eq;

    fn format(pattern: &str, kind: DateKind, zone: &TimeZone) -> String {
        date_format(pattern, kind)
            .unwrap()
            .format(&sample_date(kind), zone)
            .unwrap()
    }

    #[test]
    fn java_style_patterns() {
        let utc = TimeZone::utc();
        assert_eq!(
            format("yyyy-MM-dd HH:mm:ss", DateKind::DateTime, &utc),
            "2024-03-01 13:05:09"
        );
        assert_eq!(format("EEE, d MMM yy", DateKind::Date, &utc), "Fri, 1 Mar 24");
        assert_eq!(format("h:mm a", DateKind::Time, &utc), "1:05 PM");
        assert_eq!(format("'at' HH'h'", DateKind::Time, &utc), "at 13h");
    }

    #[test]
    fn time_zone_shifts_fields() {
        let zone = TimeZone::parse("+02:00").unwrap();
        assert_eq!(format("HH:mm Z", DateKind::Time, &zone), "15:05 +0200");
        assert_eq!(format("HH:mm XXX", DateKind::Time, &zone), "15:05 +02:00");
        assert_eq!(format("HH:mm X", DateKind::Time, &TimeZone::utc()), "13:05 Z");
    }

    #[test]
    fn presets_depend_on_the_date_kind() {
        let utc = TimeZone::utc();
        assert_eq!(format("short", DateKind::Date, &utc), "3/1/24");
        assert_eq!(format("medium", DateKind::Date, &utc), "Mar 1, 2024");
        assert_eq!(format("long", DateKind::Date, &utc), "March 1, 2024");
        assert_eq!(format("medium", DateKind::Time, &utc), "1:05:09 PM");
        assert_eq!(
            format("short_medium", DateKind::DateTime, &utc),
            "3/1/24 1:05:09 PM"
        );
    }

    #[test]
    fn iso_format() {
        let utc = TimeZone::utc();
        assert_eq!(format("iso", DateKind::DateTime, &utc), "2024-03-01T13:05:09Z");
        assert_eq!(format("iso", DateKind::Date, &utc), "2024-03-01");
        assert_eq!(format("xs", DateKind::Date, &utc), "2024-03-01Z");
        let zone = TimeZone::parse("-05:00").unwrap();
        assert_eq!(format("iso", DateKind::Time, &zone), "08:05:09-05:00");
    }

    #[test]
    fn unknown_letters_are_rejected() {
        assert!(matches!(
            date_format("yyyy-qq", DateKind::Date),
            Err(FormatError::MalformedPattern { .. })
        ));
    }

    #[test]
    fn parse_pattern_and_iso() {
        let utc = TimeZone::utc();
        let parsed = date_format("yyyy-MM-dd", DateKind::Date)
            .unwrap()
            .parse("2024-03-01", DateKind::Date, &utc)
            .unwrap();
        assert_eq!(parsed.instant.to_rfc3339(), "2024-03-01T00:00:00+00:00");
        let parsed = date_format("iso", DateKind::DateTime)
            .unwrap()
            .parse("2024-03-01T13:05:09+02:00", DateKind::DateTime, &utc)
            .unwrap();
        assert_eq!(parsed.instant.to_rfc3339(), "2024-03-01T11:05:09+00:00");
        assert!(date_format("yyyy-MM-dd", DateKind::Date)
            .unwrap()
            .parse("March", DateKind::Date, &utc)
            .is_err());
    }
}

mod cache {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reuses_and_invalidates() {
        let mut cache = FormatCache::new();
        let first = cache.number("0.0").unwrap();
        let again = cache.number("0.0").unwrap();
        assert!(Arc::ptr_eq(&first, &again));
        cache.number("c").unwrap();
        cache.date("iso", DateKind::Date).unwrap();
        cache.date("yyyy", DateKind::Date).unwrap();
        assert_eq!(cache.len(), 4);

        cache.invalidate_locale_bound();
        // `c`, `iso` and the letter-only `yyyy` pattern survive.
        assert_eq!(cache.len(), 3);

        cache.invalidate_time_zone_bound();
        assert_eq!(cache.len(), 1);
    }
}
