// src/common/time.rs

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::models::settings::CompanySettings;

/// Fuso da empresa: o gravado nas configurações, se válido, senão o padrão do servidor.
pub fn company_timezone(settings: Option<&CompanySettings>, fallback: Tz) -> Tz {
    settings
        .and_then(|s| match s.timezone.parse::<Tz>() {
            Ok(tz) => Some(tz),
            Err(_) => {
                tracing::warn!("Fuso horário inválido '{}' (empresa {}), usando padrão", s.timezone, s.company_id);
                None
            }
        })
        .unwrap_or(fallback)
}

/// Data civil de um instante no fuso informado.
pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Instante UTC de um horário local (ex.: início do expediente).
/// Em horários ambíguos (mudança de horário) usa o mais cedo.
pub fn local_instant(date: NaiveDate, time: NaiveTime, tz: Tz) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn today_in(tz: Tz) -> NaiveDate {
    local_date(Utc::now(), tz)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn late_evening_utc_is_next_day_in_tashkent() {
        let instant = Utc.with_ymd_and_hms(2025, 2, 3, 20, 30, 0).unwrap();
        assert_eq!(
            local_date(instant, chrono_tz::Asia::Tashkent),
            NaiveDate::from_ymd_opt(2025, 2, 4).unwrap()
        );
    }

    #[test]
    fn nine_am_tashkent_is_four_am_utc() {
        let date = NaiveDate::from_ymd_opt(2025, 2, 3).unwrap();
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        assert_eq!(
            local_instant(date, nine, chrono_tz::Asia::Tashkent),
            Some(Utc.with_ymd_and_hms(2025, 2, 3, 4, 0, 0).unwrap())
        );
    }
}
