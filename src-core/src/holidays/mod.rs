pub(crate) mod holiday_calendar;
pub(crate) mod holidays_model;
pub(crate) mod holidays_service;

pub use holiday_calendar::{strongest_holiday, HolidayCalendar};
pub use holidays_model::{HolidayRange, HolidayType, NewHolidayRange};
pub use holidays_service::{HolidayRepositoryTrait, HolidayService};
