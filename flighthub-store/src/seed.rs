use flighthub_core::Flight;
use rust_decimal::Decimal;

struct SeedFlight {
    flight_number: &'static str,
    airline: &'static str,
    airline_code: &'static str,
    route: (&'static str, &'static str),
    times: (&'static str, &'static str),
    duration: &'static str,
    price_pence: i64,
    aircraft: &'static str,
    stops: i32,
    amenities: &'static [&'static str],
    available_seats: i32,
}

const SEED: &[SeedFlight] = &[
    SeedFlight {
        flight_number: "KL1007",
        airline: "KLM Royal Dutch Airlines",
        airline_code: "KL",
        route: ("LHR", "AMS"),
        times: ("08:25", "10:50"),
        duration: "1h 25m",
        price_pence: 124_500,
        aircraft: "Boeing 737-800",
        stops: 0,
        amenities: &["WiFi", "Premium Meal", "Priority Boarding", "Lounge Access"],
        available_seats: 145,
    },
    SeedFlight {
        flight_number: "BA431",
        airline: "British Airways",
        airline_code: "BA",
        route: ("LHR", "AMS"),
        times: ("14:15", "16:45"),
        duration: "1h 30m",
        price_pence: 98_500,
        aircraft: "Airbus A320",
        stops: 0,
        amenities: &["WiFi", "Meal", "Entertainment"],
        available_seats: 134,
    },
    SeedFlight {
        flight_number: "AF1381",
        airline: "Air France",
        airline_code: "AF",
        route: ("LHR", "CDG"),
        times: ("09:40", "12:15"),
        duration: "1h 35m",
        price_pence: 115_000,
        aircraft: "Airbus A321",
        stops: 0,
        amenities: &["WiFi", "Premium Meal", "Entertainment", "Checked Bag"],
        available_seats: 180,
    },
    SeedFlight {
        flight_number: "EK7",
        airline: "Emirates",
        airline_code: "EK",
        route: ("LHR", "CDG"),
        times: ("16:30", "19:10"),
        duration: "1h 40m",
        price_pence: 189_000,
        aircraft: "Airbus A380",
        stops: 0,
        amenities: &["Premium WiFi", "Gourmet Meal", "Lie-flat Seats", "Champagne Service"],
        available_seats: 85,
    },
    SeedFlight {
        flight_number: "VS3",
        airline: "Virgin Atlantic",
        airline_code: "VS",
        route: ("LHR", "JFK"),
        times: ("11:45", "15:10"),
        duration: "8h 25m",
        price_pence: 245_000,
        aircraft: "Boeing 787-9",
        stops: 0,
        amenities: &["Premium WiFi", "Premium Meal", "Entertainment", "Premium Economy"],
        available_seats: 280,
    },
    SeedFlight {
        flight_number: "BA117",
        airline: "British Airways",
        airline_code: "BA",
        route: ("LHR", "JFK"),
        times: ("19:25", "22:55"),
        duration: "8h 30m",
        price_pence: 312_500,
        aircraft: "Boeing 777-300ER",
        stops: 0,
        amenities: &["Premium WiFi", "Business Class Meal", "Flat Bed", "Lounge Access"],
        available_seats: 156,
    },
    SeedFlight {
        flight_number: "EK1",
        airline: "Emirates",
        airline_code: "EK",
        route: ("LHR", "DXB"),
        times: ("14:45", "00:50"),
        duration: "7h 05m",
        price_pence: 187_500,
        aircraft: "Airbus A380",
        stops: 0,
        amenities: &["Premium WiFi", "Gourmet Meal", "Entertainment", "Shower Spa"],
        available_seats: 220,
    },
    SeedFlight {
        flight_number: "FR2453",
        airline: "Ryanair",
        airline_code: "FR",
        route: ("MAN", "BCN"),
        times: ("06:30", "09:45"),
        duration: "2h 15m",
        price_pence: 92_500,
        aircraft: "Boeing 737-800",
        stops: 0,
        amenities: &["WiFi", "Food Purchase"],
        available_seats: 189,
    },
    SeedFlight {
        flight_number: "VY8301",
        airline: "Vueling Airlines",
        airline_code: "VY",
        route: ("MAN", "BCN"),
        times: ("12:20", "15:35"),
        duration: "2h 15m",
        price_pence: 106_500,
        aircraft: "Airbus A320",
        stops: 0,
        amenities: &["WiFi", "Meal", "Entertainment"],
        available_seats: 156,
    },
    SeedFlight {
        flight_number: "FR817",
        airline: "Ryanair",
        airline_code: "FR",
        route: ("EDI", "FCO"),
        times: ("07:15", "11:20"),
        duration: "3h 05m",
        price_pence: 94_500,
        aircraft: "Boeing 737-800",
        stops: 0,
        amenities: &["WiFi", "Food Purchase"],
        available_seats: 180,
    },
    SeedFlight {
        flight_number: "AZ205",
        airline: "Alitalia",
        airline_code: "AZ",
        route: ("EDI", "FCO"),
        times: ("15:40", "19:55"),
        duration: "3h 15m",
        price_pence: 129_000,
        aircraft: "Airbus A321",
        stops: 0,
        amenities: &["WiFi", "Premium Meal", "Entertainment", "Lounge Access"],
        available_seats: 165,
    },
    SeedFlight {
        flight_number: "LH925",
        airline: "Lufthansa",
        airline_code: "LH",
        route: ("BHX", "FRA"),
        times: ("08:45", "11:25"),
        duration: "1h 40m",
        price_pence: 118_500,
        aircraft: "Airbus A319",
        stops: 0,
        amenities: &["WiFi", "Premium Meal", "Business Lounge"],
        available_seats: 124,
    },
    SeedFlight {
        flight_number: "JL44",
        airline: "Japan Airlines",
        airline_code: "JL",
        route: ("LGW", "NRT"),
        times: ("12:35", "08:15"),
        duration: "11h 40m",
        price_pence: 425_000,
        aircraft: "Boeing 787-9",
        stops: 0,
        amenities: &["Premium WiFi", "Japanese Cuisine", "Lie-flat Seats", "Onsen Spa"],
        available_seats: 195,
    },
    SeedFlight {
        flight_number: "QF1",
        airline: "Qantas",
        airline_code: "QF",
        route: ("LHR", "SYD"),
        times: ("21:45", "05:25"),
        duration: "21h 40m",
        price_pence: 589_000,
        aircraft: "Airbus A380",
        stops: 1,
        amenities: &["Premium WiFi", "First Class Dining", "Private Suites", "Spa Services"],
        available_seats: 120,
    },
];

/// The demo catalog with ids assigned from 1 in listing order.
pub fn seed_flights() -> Vec<Flight> {
    SEED.iter()
        .zip(1..)
        .map(|(s, id)| Flight {
            id,
            flight_number: s.flight_number.to_string(),
            airline: s.airline.to_string(),
            airline_code: s.airline_code.to_string(),
            departure_airport: s.route.0.to_string(),
            arrival_airport: s.route.1.to_string(),
            departure_time: s.times.0.to_string(),
            arrival_time: s.times.1.to_string(),
            duration: s.duration.to_string(),
            price: Decimal::new(s.price_pence, 2),
            aircraft: Some(s.aircraft.to_string()),
            stops: s.stops,
            amenities: s.amenities.iter().map(|a| a.to_string()).collect(),
            available_seats: s.available_seats,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_ids_and_prices() {
        let flights = seed_flights();
        assert_eq!(flights.len(), 14);
        assert_eq!(flights[0].id, 1);
        assert_eq!(flights[0].flight_number, "KL1007");
        assert_eq!(flights[0].price.to_string(), "1245.00");
        assert_eq!(flights[13].stops, 1);
    }
}
