#[macro_use]
mod utils;

rankine_scenario!(northeast_of_radar, 60.0, 70.0, 40.0, 50.0);
rankine_scenario!(small_intense_eye, -50.0, 80.0, 25.0, 60.0);
rankine_scenario!(south_of_radar, 20.0, -90.0, 35.0, 45.0);
