use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ResampleError;

/// Calendar period observations are averaged over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Resolution {
    #[default]
    #[serde(rename = "D")]
    Daily,
    #[serde(rename = "M")]
    Monthly,
    #[serde(rename = "Y")]
    Yearly,
}

impl Resolution {
    pub fn code(&self) -> &'static str {
        match self {
            Resolution::Daily => "D",
            Resolution::Monthly => "M",
            Resolution::Yearly => "Y",
        }
    }

    /// First instant of the period containing `dt`.
    pub fn bucket_start(&self, dt: NaiveDateTime) -> NaiveDateTime {
        self.first_day(dt.date()).and_time(NaiveTime::MIN)
    }

    /// Last calendar day of the period containing `dt`, or `None` when that period runs past
    /// the last representable date.
    pub fn bucket_end(&self, dt: NaiveDateTime) -> Option<NaiveDate> {
        let first = self.first_day(dt.date());
        let months = match self {
            Resolution::Daily => return Some(first),
            Resolution::Monthly => Months::new(1),
            Resolution::Yearly => Months::new(12),
        };
        first
            .checked_add_months(months)?
            .checked_sub_days(Days::new(1))
    }

    fn first_day(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Resolution::Daily => date,
            Resolution::Monthly => date - Days::new(u64::from(date.day0())),
            Resolution::Yearly => date - Days::new(u64::from(date.ordinal0())),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Resolution {
    type Err = ResampleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "D" => Ok(Resolution::Daily),
            "M" => Ok(Resolution::Monthly),
            "Y" => Ok(Resolution::Yearly),
            other => Err(ResampleError::InvalidResolution(other.to_string())),
        }
    }
}

/// Which end of a period labels its bucket in the output `time` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketLabel {
    #[default]
    Start,
    /// Last day of the period at midnight, the pandas `M`/`Y` anchoring.
    End,
}

impl BucketLabel {
    pub fn label(&self, resolution: Resolution, dt: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            BucketLabel::Start => Some(resolution.bucket_start(dt)),
            BucketLabel::End => resolution
                .bucket_end(dt)
                .map(|date| date.and_time(NaiveTime::MIN)),
        }
    }
}

impl fmt::Display for BucketLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketLabel::Start => f.write_str("start"),
            BucketLabel::End => f.write_str("end"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn bucket_start_truncates_to_period() {
        let dt = at(2020, 2, 29, 17, 45);
        assert_eq!(Resolution::Daily.bucket_start(dt), at(2020, 2, 29, 0, 0));
        assert_eq!(Resolution::Monthly.bucket_start(dt), at(2020, 2, 1, 0, 0));
        assert_eq!(Resolution::Yearly.bucket_start(dt), at(2020, 1, 1, 0, 0));
    }

    #[test]
    fn bucket_end_handles_leap_february() {
        let dt = at(2020, 2, 10, 6, 0);
        assert_eq!(
            Resolution::Monthly.bucket_end(dt),
            NaiveDate::from_ymd_opt(2020, 2, 29)
        );
        assert_eq!(
            Resolution::Monthly.bucket_end(at(2021, 2, 10, 6, 0)),
            NaiveDate::from_ymd_opt(2021, 2, 28)
        );
        assert_eq!(
            Resolution::Yearly.bucket_end(dt),
            NaiveDate::from_ymd_opt(2020, 12, 31)
        );
    }

    #[test]
    fn end_label_is_midnight_of_last_day() {
        let dt = at(2020, 1, 15, 9, 0);
        assert_eq!(
            BucketLabel::End.label(Resolution::Monthly, dt),
            Some(at(2020, 1, 31, 0, 0))
        );
        assert_eq!(
            BucketLabel::Start.label(Resolution::Monthly, dt),
            Some(at(2020, 1, 1, 0, 0))
        );
    }

    #[test]
    fn end_of_last_representable_period_is_none() {
        let last = NaiveDate::MAX.and_hms_opt(12, 0, 0).unwrap();
        assert_eq!(Resolution::Daily.bucket_end(last), Some(NaiveDate::MAX));
        assert_eq!(Resolution::Monthly.bucket_end(last), None);
        assert_eq!(Resolution::Yearly.bucket_end(last), None);
        assert_eq!(BucketLabel::End.label(Resolution::Monthly, last), None);
        assert!(BucketLabel::Start.label(Resolution::Monthly, last).is_some());
    }

    #[test]
    fn parses_only_known_codes() {
        assert_eq!("D".parse::<Resolution>().unwrap(), Resolution::Daily);
        assert_eq!(" M ".parse::<Resolution>().unwrap(), Resolution::Monthly);
        assert_eq!("Y".parse::<Resolution>().unwrap(), Resolution::Yearly);

        for bad in ["W", "d", "H", "", "MS"] {
            let err = bad.parse::<Resolution>().unwrap_err();
            assert!(matches!(err, ResampleError::InvalidResolution(_)), "{bad:?}");
        }
    }
}
