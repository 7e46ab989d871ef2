//! Cultural calendar reference data: holidays, travel seasons, regional
//! customs, and a bilingual glossary. Loaded once, immutable process-wide.
//!
//! Holiday dates are authored as fixed Gregorian dates even for lunar (Hijri)
//! observances, flagged `is_lunar`; the ±30-day activity window absorbs part
//! of the year-over-year drift. Season windows are recurring month/day ranges
//! that partition the full year, so the current-season lookup is always
//! defined and unique for a correctly authored table.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::models::{CulturalPreferences, Locale};

/// A holiday is "active" within this many days of the reference date,
/// boundary inclusive.
pub const HOLIDAY_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BilingualText {
    pub en: &'static str,
    pub ar: &'static str,
}

impl BilingualText {
    pub fn for_locale(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::En => self.en,
            Locale::Ar => self.ar,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HolidayCategory {
    Islamic,
    National,
    Cultural,
}

#[derive(Debug, Clone, Serialize)]
pub struct Holiday {
    pub id: &'static str,
    pub name: BilingualText,
    pub significance: BilingualText,
    pub travel_considerations: BilingualText,
    pub recommendations: BilingualText,
    pub date: NaiveDate,
    pub is_lunar: bool,
    pub category: HolidayCategory,
}

/// A named recurring calendar window. `start` is inclusive, `end` exclusive,
/// both as (month, day); a window with `start > end` wraps the year boundary.
#[derive(Debug, Clone, Serialize)]
pub struct Season {
    pub id: &'static str,
    pub name: BilingualText,
    pub description: BilingualText,
    pub start: (u32, u32),
    pub end: (u32, u32),
    pub travel_impact: BilingualText,
    pub recommendations: BilingualText,
}

impl Season {
    pub fn contains(&self, date: NaiveDate) -> bool {
        let key = (date.month(), date.day());
        if self.start <= self.end {
            self.start <= key && key < self.end
        } else {
            key >= self.start || key < self.end
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegionalCustom {
    pub id: &'static str,
    pub region: &'static str,
    pub summary: BilingualText,
    pub advice: BilingualText,
}

#[derive(Debug, Clone, Serialize)]
pub struct GlossaryTerm {
    pub term: BilingualText,
    pub definition: BilingualText,
}

fn gregorian(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("authored calendar date is valid")
}

// Lunar observances below carry the Gregorian dates of the year the table was
// authored for; data-authoring tests keep the table internally consistent.
static HOLIDAYS: Lazy<Vec<Holiday>> = Lazy::new(|| {
    vec![
        Holiday {
            id: "saudi-founding-day",
            name: BilingualText {
                en: "Founding Day",
                ar: "يوم التأسيس",
            },
            significance: BilingualText {
                en: "Commemorates the founding of the first Saudi state",
                ar: "ذكرى تأسيس الدولة السعودية الأولى",
            },
            travel_considerations: BilingualText {
                en: "Public events and heavy traffic around city centers",
                ar: "فعاليات عامة وازدحام مروري حول مراكز المدن",
            },
            recommendations: BilingualText {
                en: "Book heritage-district tours early; expect festive crowds",
                ar: "احجز جولات الأحياء التراثية مبكرا وتوقع حشودا احتفالية",
            },
            date: gregorian(2025, 2, 22),
            is_lunar: false,
            category: HolidayCategory::National,
        },
        Holiday {
            id: "ramadan-start",
            name: BilingualText {
                en: "Ramadan",
                ar: "رمضان",
            },
            significance: BilingualText {
                en: "The holy month of fasting",
                ar: "شهر الصيام الفضيل",
            },
            travel_considerations: BilingualText {
                en: "Daytime dining is limited; business hours shift to evenings",
                ar: "خيارات الطعام نهارا محدودة وساعات العمل تتحول إلى المساء",
            },
            recommendations: BilingualText {
                en: "Plan activities after iftar; many attractions open late at night",
                ar: "خطط للأنشطة بعد الإفطار؛ كثير من المعالم تفتح حتى وقت متأخر",
            },
            date: gregorian(2025, 3, 1),
            is_lunar: true,
            category: HolidayCategory::Islamic,
        },
        Holiday {
            id: "eid-al-fitr",
            name: BilingualText {
                en: "Eid al-Fitr",
                ar: "عيد الفطر",
            },
            significance: BilingualText {
                en: "Festival marking the end of Ramadan",
                ar: "عيد نهاية شهر رمضان",
            },
            travel_considerations: BilingualText {
                en: "Peak domestic travel; flights and hotels fill quickly",
                ar: "ذروة السفر الداخلي؛ الرحلات والفنادق تمتلئ بسرعة",
            },
            recommendations: BilingualText {
                en: "Reserve transport weeks ahead; family venues are busiest",
                ar: "احجز المواصلات قبل أسابيع؛ الأماكن العائلية هي الأكثر ازدحاما",
            },
            date: gregorian(2025, 3, 30),
            is_lunar: true,
            category: HolidayCategory::Islamic,
        },
        Holiday {
            id: "hajj-season",
            name: BilingualText {
                en: "Hajj Season",
                ar: "موسم الحج",
            },
            significance: BilingualText {
                en: "The annual pilgrimage to Mecca",
                ar: "موسم الحج السنوي إلى مكة المكرمة",
            },
            travel_considerations: BilingualText {
                en: "Entry to Mecca is restricted to permit holders",
                ar: "دخول مكة مقصور على حاملي التصاريح",
            },
            recommendations: BilingualText {
                en: "Route leisure trips away from Mecca and Jeddah transit hubs",
                ar: "وجه الرحلات الترفيهية بعيدا عن مكة ومحاور النقل في جدة",
            },
            date: gregorian(2025, 6, 4),
            is_lunar: true,
            category: HolidayCategory::Islamic,
        },
        Holiday {
            id: "eid-al-adha",
            name: BilingualText {
                en: "Eid al-Adha",
                ar: "عيد الأضحى",
            },
            significance: BilingualText {
                en: "Festival of sacrifice at the close of Hajj",
                ar: "عيد الأضحى في ختام الحج",
            },
            travel_considerations: BilingualText {
                en: "Extended public holiday; intercity roads are congested",
                ar: "عطلة رسمية ممتدة وطرق المدن مزدحمة",
            },
            recommendations: BilingualText {
                en: "Prefer rail over road travel during the holiday week",
                ar: "فضل القطار على الطرق البرية خلال أسبوع العيد",
            },
            date: gregorian(2025, 6, 6),
            is_lunar: true,
            category: HolidayCategory::Islamic,
        },
        Holiday {
            id: "saudi-national-day",
            name: BilingualText {
                en: "Saudi National Day",
                ar: "اليوم الوطني السعودي",
            },
            significance: BilingualText {
                en: "Celebrates the unification of the Kingdom",
                ar: "ذكرى توحيد المملكة",
            },
            travel_considerations: BilingualText {
                en: "Fireworks, road closures, and discounted domestic fares",
                ar: "ألعاب نارية وإغلاق طرق وعروض على الرحلات الداخلية",
            },
            recommendations: BilingualText {
                en: "Watch for airline promotions; book viewpoints for fireworks",
                ar: "ترقب عروض الطيران واحجز أماكن مشاهدة الألعاب النارية",
            },
            date: gregorian(2025, 9, 23),
            is_lunar: false,
            category: HolidayCategory::National,
        },
        Holiday {
            id: "riyadh-season",
            name: BilingualText {
                en: "Riyadh Season",
                ar: "موسم الرياض",
            },
            significance: BilingualText {
                en: "City-wide entertainment festival through the cooler months",
                ar: "مهرجان ترفيهي يعم المدينة خلال الأشهر الباردة",
            },
            travel_considerations: BilingualText {
                en: "Hotel demand in Riyadh spikes on event weekends",
                ar: "الطلب على فنادق الرياض يرتفع في عطلات نهاية الأسبوع",
            },
            recommendations: BilingualText {
                en: "Pair event tickets with midweek stays for better rates",
                ar: "اجمع تذاكر الفعاليات مع إقامة منتصف الأسبوع بأسعار أفضل",
            },
            date: gregorian(2025, 10, 10),
            is_lunar: false,
            category: HolidayCategory::Cultural,
        },
    ]
});

static SEASONS: Lazy<Vec<Season>> = Lazy::new(|| {
    vec![
        Season {
            id: "winter",
            name: BilingualText {
                en: "Winter",
                ar: "الشتاء",
            },
            description: BilingualText {
                en: "Mild days and cool desert nights",
                ar: "نهار معتدل وليال صحراوية باردة",
            },
            start: (12, 1),
            end: (3, 1),
            travel_impact: BilingualText {
                en: "High season for desert trips and outdoor festivals",
                ar: "موسم الذروة للرحلات الصحراوية والمهرجانات الخارجية",
            },
            recommendations: BilingualText {
                en: "Ideal for AlUla and Red Sea itineraries; pack warm layers",
                ar: "مثالي لبرامج العلا والبحر الأحمر؛ خذ ملابس دافئة",
            },
        },
        Season {
            id: "spring",
            name: BilingualText {
                en: "Spring",
                ar: "الربيع",
            },
            description: BilingualText {
                en: "Warming weather with occasional sandstorms",
                ar: "طقس دافئ مع عواصف رملية أحيانا",
            },
            start: (3, 1),
            end: (6, 1),
            travel_impact: BilingualText {
                en: "Shoulder season; Ramadan often shifts daily rhythms",
                ar: "موسم متوسط؛ رمضان غالبا يغير إيقاع اليوم",
            },
            recommendations: BilingualText {
                en: "Book flexible itineraries around religious observances",
                ar: "احجز برامج مرنة حول المناسبات الدينية",
            },
        },
        Season {
            id: "summer",
            name: BilingualText {
                en: "Summer",
                ar: "الصيف",
            },
            description: BilingualText {
                en: "Intense heat inland, humid on the coasts",
                ar: "حر شديد في الداخل ورطوبة على السواحل",
            },
            start: (6, 1),
            end: (9, 1),
            travel_impact: BilingualText {
                en: "Outdoor activity moves to early mornings and evenings",
                ar: "الأنشطة الخارجية تنتقل إلى الصباح الباكر والمساء",
            },
            recommendations: BilingualText {
                en: "Favor highland escapes like Abha and indoor attractions",
                ar: "فضل مرتفعات مثل أبها والمعالم الداخلية المكيفة",
            },
        },
        Season {
            id: "autumn",
            name: BilingualText {
                en: "Autumn",
                ar: "الخريف",
            },
            description: BilingualText {
                en: "Cooling temperatures and returning event calendars",
                ar: "درجات حرارة تنخفض وعودة تقويم الفعاليات",
            },
            start: (9, 1),
            end: (12, 1),
            travel_impact: BilingualText {
                en: "Festival season ramps up; city hotels get busy",
                ar: "مواسم المهرجانات تنشط وفنادق المدن تزدحم",
            },
            recommendations: BilingualText {
                en: "Combine National Day offers with city-break packages",
                ar: "اجمع عروض اليوم الوطني مع باقات العطلات القصيرة",
            },
        },
    ]
});

static REGIONAL_CUSTOMS: Lazy<Vec<RegionalCustom>> = Lazy::new(|| {
    vec![
        RegionalCustom {
            id: "hejaz-hospitality",
            region: "Hejaz",
            summary: BilingualText {
                en: "Guests are traditionally welcomed with Arabic coffee and dates",
                ar: "يستقبل الضيوف تقليديا بالقهوة العربية والتمر",
            },
            advice: BilingualText {
                en: "Accept refreshments with the right hand when offered",
                ar: "تقبل الضيافة باليد اليمنى عند تقديمها",
            },
        },
        RegionalCustom {
            id: "friday-rhythm",
            region: "Kingdom-wide",
            summary: BilingualText {
                en: "Friday midday pauses for congregational prayer",
                ar: "يتوقف منتصف نهار الجمعة لصلاة الجمعة",
            },
            advice: BilingualText {
                en: "Schedule tours and checkouts outside Friday prayer hours",
                ar: "جدول الجولات وتسجيل المغادرة خارج وقت صلاة الجمعة",
            },
        },
        RegionalCustom {
            id: "najd-dress",
            region: "Najd",
            summary: BilingualText {
                en: "Modest dress is appreciated in traditional districts",
                ar: "اللباس المحتشم محل تقدير في الأحياء التقليدية",
            },
            advice: BilingualText {
                en: "Carry a light cover-up for souqs and heritage sites",
                ar: "احمل غطاء خفيفا للأسواق والمواقع التراثية",
            },
        },
    ]
});

static GLOSSARY: Lazy<Vec<GlossaryTerm>> = Lazy::new(|| {
    vec![
        GlossaryTerm {
            term: BilingualText {
                en: "iftar",
                ar: "إفطار",
            },
            definition: BilingualText {
                en: "The sunset meal breaking the Ramadan fast",
                ar: "وجبة غروب الشمس التي يفطر بها الصائم في رمضان",
            },
        },
        GlossaryTerm {
            term: BilingualText {
                en: "umrah",
                ar: "عمرة",
            },
            definition: BilingualText {
                en: "The lesser pilgrimage to Mecca, performable year-round",
                ar: "الزيارة إلى مكة التي تؤدى في أي وقت من السنة",
            },
        },
        GlossaryTerm {
            term: BilingualText {
                en: "majlis",
                ar: "مجلس",
            },
            definition: BilingualText {
                en: "A traditional sitting room for receiving guests",
                ar: "مكان جلوس تقليدي لاستقبال الضيوف",
            },
        },
    ]
});

/// Every holiday within ±30 days (inclusive) of the reference date, in table
/// declaration order. Callers needing the "primary" holiday take the first.
pub fn active_holidays(reference: NaiveDate) -> Vec<&'static Holiday> {
    HOLIDAYS
        .iter()
        .filter(|holiday| {
            reference
                .signed_duration_since(holiday.date)
                .num_days()
                .abs()
                <= HOLIDAY_WINDOW_DAYS
        })
        .collect()
}

/// The unique season containing the reference date. `None` means the table
/// has an authoring gap and callers should apply no seasonal bias.
pub fn active_season(reference: NaiveDate) -> Option<&'static Season> {
    SEASONS.iter().find(|season| season.contains(reference))
}

pub fn regional_customs() -> &'static [RegionalCustom] {
    &REGIONAL_CUSTOMS
}

pub fn glossary() -> &'static [GlossaryTerm] {
    &GLOSSARY
}

/// Deterministic locale-to-defaults mapping. This is the only place locale
/// influences default behavior; it never re-runs once a session exists.
pub fn default_cultural_preferences(locale: Locale) -> CulturalPreferences {
    let baseline = CulturalPreferences {
        family_friendly: true,
        conservative_dress: true,
        ramadan_aware: false,
        hajj_season_aware: false,
        gender_separated: false,
        alcohol_free: true,
        friday_prayer_aware: true,
    };

    match locale {
        Locale::En => baseline,
        Locale::Ar => CulturalPreferences {
            ramadan_aware: true,
            hajj_season_aware: true,
            gender_separated: true,
            ..baseline
        },
    }
}
