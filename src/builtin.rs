//! Built-in Starter Home catalog.
//!
//! Prices are net PLN.

use crate::catalog::{Catalog, House, HouseDetails, HouseStatus, ItemKind, ItemOption, OfferItem};

/// Per-house price schedule feeding the standard item template
#[derive(Debug, Clone, Copy)]
pub struct PriceSchedule {
    pub shell: u64,
    pub developer: u64,
    pub foundation: u64,
    pub heating: HeatingPrices,
    pub air_conditioning: u64,
    pub septic: u64,
    pub treatment_plant: u64,
    pub blinds: u64,
    pub terrace_per_m2: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct HeatingPrices {
    pub electric: u64,
    pub pump_full: u64,
    pub pump_solo: u64,
    pub ac_heat: u64,
}

const PERMITS_SERVICE: u64 = 9500;

const fn schedule(
    shell: u64,
    developer: u64,
    foundation: u64,
    heating: [u64; 4],
    air_conditioning: u64,
    treatment_plant: u64,
    blinds: u64,
) -> PriceSchedule {
    PriceSchedule {
        shell,
        developer,
        foundation,
        heating: HeatingPrices {
            electric: heating[0],
            pump_full: heating[1],
            pump_solo: heating[2],
            ac_heat: heating[3],
        },
        air_conditioning,
        septic: 14500,
        treatment_plant,
        blinds,
        terrace_per_m2: 990,
    }
}

struct Listing {
    id: &'static str,
    name: &'static str,
    area: &'static str,
    built_area: &'static str,
    usable_area: &'static str,
    bedrooms: &'static str,
    description: &'static str,
    image: &'static str,
    floor_plan: &'static str,
    prices: PriceSchedule,
}

const LISTINGS: &[Listing] = &[
    Listing {
        id: "zenith_house",
        name: "Zenith HOUSE",
        area: "Do ustalenia",
        built_area: "35 m²",
        usable_area: "55 m²",
        bedrooms: "2",
        description: "Zenith House 35 m² łączy elegancję z przytulnością. Duże przeszklenia na bocznej ścianie nadają budynkowi wyjątkowy charakter.",
        image: "https://starterhome.pl/wp-content/uploads/2025/10/enhanced_ujecie-1-przod-scaled.png",
        floor_plan: "https://todybnsadf.cfolks.pl/Zenith.pdf",
        prices: schedule(184900, 249800, 26250, [28700, 58800, 23800, 7000], 7000, 17400, 9500),
    },
    Listing {
        id: "nest_house",
        name: "NEST HOUSE",
        area: "70 m²",
        built_area: "55 m²",
        usable_area: "45 m²",
        bedrooms: "2",
        description: "Dom o powierzchni użytkowej 45 m² został zaprojektowany z myślą o funkcjonalności. Posiada dwie sypialnie, salon z aneksem kuchennym oraz łazienkę.",
        image: "https://starterhome.pl/wp-content/uploads/2025/09/Nest-House-1-scaled.png",
        floor_plan: "https://todybnsadf.cfolks.pl/Nest.pdf",
        prices: schedule(164000, 219800, 41250, [22700, 48500, 19800, 7000], 7000, 18400, 11800),
    },
    Listing {
        id: "haven_house",
        name: "Haven HOUSE",
        area: "Do ustalenia",
        built_area: "69 m²",
        usable_area: "58 m²",
        bedrooms: "2",
        description: "Praktyczny dom o 58 m² powierzchni użytkowej łączy funkcjonalność z komfortem. Znajdują się w nim dwie sypialnie, otwarty salon z kuchnią oraz łazienka.",
        image: "https://starterhome.pl/wp-content/uploads/2025/09/Haven-House-1.png",
        floor_plan: "https://todybnsadf.cfolks.pl/Haven.pdf",
        prices: schedule(184900, 286700, 51750, [28770, 58800, 23800, 7000], 7000, 17400, 9500),
    },
    Listing {
        id: "balance_house",
        name: "Balance HOUSE",
        area: "Do ustalenia",
        built_area: "94 m²",
        usable_area: "80 m²",
        bedrooms: "3",
        description: "Dom o 80 m² powierzchni użytkowej oferuje komfortową przestrzeń dla rodziny. Składa się z trzech sypialni, salonu z aneksem kuchennym oraz łazienki.",
        image: "https://starterhome.pl/wp-content/uploads/2025/09/Balance-House-1-1024x768.png",
        floor_plan: "https://todybnsadf.cfolks.pl/Balance.pdf",
        prices: schedule(224900, 329700, 72250, [39050, 67200, 30800, 7000], 7000, 17400, 10500),
    },
    Listing {
        id: "comfort_house",
        name: "Comfort HOUSE",
        area: "Do ustalenia",
        built_area: "103 m²",
        usable_area: "86 m²",
        bedrooms: "3",
        description: "Comfort House to parterowy dom o powierzchni 86 m², stworzony z myślą o wygodzie rodziny. Posiada trzy sypialnie oraz otwartą część dzienną.",
        image: "https://starterhome.pl/wp-content/uploads/2025/09/Comfort-House-1-1024x768.png",
        floor_plan: "https://todybnsadf.cfolks.pl/Comfort.pdf",
        prices: schedule(273400, 377700, 77250, [42300, 68800, 33800, 8000], 7000, 17400, 11900),
    },
    Listing {
        id: "vista_house",
        name: "Vista HOUSE",
        area: "Do ustalenia",
        built_area: "126 m²",
        usable_area: "108 m²",
        bedrooms: "3-4",
        description: "Duży, komfortowy dom o 108 m² powierzchni użytkowej zapewnia przestrzeń i wygodę dla całej rodziny.",
        image: "https://starterhome.pl/wp-content/uploads/2025/10/Vista-House-1-1024x768.png",
        floor_plan: "https://todybnsadf.cfolks.pl/Vista.pdf",
        prices: schedule(295700, 420900, 94500, [55100, 77600, 37800, 8000], 8000, 17400, 12500),
    },
    Listing {
        id: "peak_house",
        name: "Peak HOUSE",
        area: "Do ustalenia",
        built_area: "67 m²",
        usable_area: "111 m²",
        bedrooms: "3-4",
        description: "Piętrowy dom o 111 m² powierzchni użytkowej łączy przestronność z funkcjonalnością.",
        image: "https://starterhome.pl/wp-content/uploads/2025/09/Peak-House-1-scaled.png",
        floor_plan: "https://todybnsadf.cfolks.pl/Peak.pdf",
        prices: schedule(259800, 359700, 50250, [27700, 58800, 23800, 7000], 7000, 17400, 10500),
    },
    Listing {
        id: "skyline_house",
        name: "Skyline HOUSE",
        area: "Do ustalenia",
        built_area: "35 m²",
        usable_area: "45 m²",
        bedrooms: "1-3",
        description: "Nowoczesny dom o formie stodoły, 35 m², z praktycznym parterem i antresolą.",
        image: "https://starterhome.pl/wp-content/uploads/2025/10/ujecie-1-scaled.png",
        floor_plan: "https://todybnsadf.cfolks.pl/Skyline.pdf",
        prices: schedule(174900, 239800, 26250, [28700, 58800, 23800, 7000], 7000, 17400, 8000),
    },
];

/// House the configurator opens with.
pub const DEFAULT_HOUSE_ID: &str = "nest_house";

fn choice(id: &str, name: &str, price: u64) -> ItemOption {
    ItemOption { id: id.to_string(), name: name.to_string(), price }
}

fn item(code: &str, name: &str, description: &str, kind: ItemKind) -> OfferItem {
    OfferItem {
        code: code.to_string(),
        name: name.to_string(),
        description: Some(description.to_string()),
        kind,
        default_value: None,
    }
}

/// Standard item set derived from a house's price schedule.
pub fn standard_items(prices: &PriceSchedule) -> Vec<OfferItem> {
    vec![
        item(
            "FUND",
            "Fundamenty",
            "Wybierz zakres prac fundamentowych",
            ItemKind::SingleChoice {
                options: vec![
                    choice("plate", "Płyta fundamentowa (z posadzką i izolacją)", prices.foundation),
                    choice("self", "Robię we własnym zakresie", 0),
                ],
            },
        ),
        item(
            "FORM",
            "Formalności urzędowe",
            "Pozwolenie lub zgłoszenie budowy",
            ItemKind::SingleChoice {
                options: vec![
                    choice("service", "Zlecam Wam (komplet dokumentacji)", PERMITS_SERVICE),
                    choice("self", "Robię we własnym zakresie", 0),
                ],
            },
        ),
        item(
            "HEAT",
            "Ogrzewanie",
            "Wybierz system grzewczy",
            ItemKind::SingleChoice {
                options: vec![
                    choice("elec", "Ogrzewanie podłogowe elektryczne", prices.heating.electric),
                    choice("pump_full", "Podłogowe wodne + pompa ciepła + wylewka", prices.heating.pump_full),
                    choice(
                        "pump_solo",
                        "Podłogowe wodne (rozłożenie) - klient kupuje źródło",
                        prices.heating.pump_solo,
                    ),
                    choice("ac_heat", "Klimatyzator z funkcją grzania", prices.heating.ac_heat),
                ],
            },
        ),
        item(
            "AC",
            "Klimatyzacja (Chłodzenie)",
            "Dodatkowa jednostka do chłodzenia",
            ItemKind::Toggle { price: prices.air_conditioning },
        ),
        item(
            "SEW",
            "Gospodarka wodno-ściekowa",
            "Wybierz rozwiązanie (można wybrać tylko jedno)",
            ItemKind::SingleChoice {
                options: vec![
                    choice("septic", "Szambo (10m3) z montażem", prices.septic),
                    choice("wwtp", "Przydomowa oczyszczalnia ścieków", prices.treatment_plant),
                    choice("none", "Brak / Własny zakres", 0),
                ],
            },
        ),
        item(
            "BLINDS",
            "Rolety zewnętrzne",
            "Elektryczne rolety podtynkowe",
            ItemKind::Toggle { price: prices.blinds },
        ),
        item(
            "TERRACE",
            "Taras drewniany",
            "Konstrukcja i deska modrzewiowa",
            ItemKind::Quantity { unit_price: prices.terrace_per_m2, unit: "m²".to_string() },
        ),
    ]
}

impl Catalog {
    /// The Starter Home catalog shipped with the engine
    pub fn builtin() -> Self {
        let mut catalog = Catalog::new();
        for listing in LISTINGS {
            let house = House {
                id: listing.id.to_string(),
                name: listing.name.to_string(),
                status: HouseStatus::Completed,
                image: listing.image.to_string(),
                base_price: listing.prices.shell,
                developer_price: listing.prices.developer,
                area: listing.area.to_string(),
                details: Some(HouseDetails {
                    built_area: listing.built_area.to_string(),
                    usable_area: listing.usable_area.to_string(),
                    bedrooms: listing.bedrooms.to_string(),
                }),
                description: Some(listing.description.to_string()),
                floor_plan_pdf: Some(listing.floor_plan.to_string()),
            };
            let registered = catalog.register(house, standard_items(&listing.prices));
            debug_assert!(registered.is_ok(), "standard item codes must be unique");
        }
        catalog
    }
}
