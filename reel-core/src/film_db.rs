//! Static film database
//!
//! Maps film titles to director, color/black-and-white flag and release year,
//! and director codes to names. Titles double as the directory and file stem
//! of each film's feature files.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;

/// Which catalogue a film belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Feature,
    Documentary,
    PaperPrint,
}

/// One catalogued film
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilmEntry {
    pub title: &'static str,
    /// Director code, empty when unattributed
    pub director: &'static str,
    pub color: bool,
    pub year: Option<u16>,
    pub collection: Collection,
}

/// Color filter used when building analysis pools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorFilter {
    BlackAndWhite,
    Color,
    Any,
}

impl ColorFilter {
    pub fn accepts(&self, entry: &FilmEntry) -> bool {
        match self {
            ColorFilter::BlackAndWhite => !entry.color,
            ColorFilter::Color => entry.color,
            ColorFilter::Any => true,
        }
    }
}

const fn film(
    title: &'static str,
    director: &'static str,
    color: bool,
    year: Option<u16>,
    collection: Collection,
) -> FilmEntry {
    FilmEntry {
        title,
        director,
        color,
        year,
        collection,
    }
}

/// Director codes and names
pub static DIRECTORS: &[(&str, &str)] = &[
    ("AH", "Alfred Hitchcock"),
    ("AK", "Akira Kurosawa"),
    ("AT", "Andrei Tarkovsky"),
    ("CB", "Coen Brothers"),
    ("DA", "Darren Aronofsky"),
    ("DL", "David Lynch"),
    ("JLG", "Jean-Luc Godard"),
    ("JF", "John Ford"),
    ("HH", "Howard Hawks"),
    ("LB", "Luis Bunuel"),
    ("SS", "Steven Spielberg"),
    ("YO", "Yasujiro Ozu"),
    ("other", "other"),
];

/// Every catalogued film
pub static FILMS: &[FilmEntry] = &[
    film("3_Bad_Men", "JF", false, Some(1926), Collection::Feature),
    film("3_Godfathers", "JF", false, Some(1936), Collection::Feature),
    film("A_Serious_Man", "CB", true, Some(2009), Collection::Feature),
    film("A_Woman_is_a_Woman", "JLG", true, Some(1961), Collection::Feature),
    film("Alphaville", "JLG", false, Some(1965), Collection::Feature),
    film("Amistad", "SS", true, Some(1997), Collection::Feature),
    film("Arrowsmith", "JF", false, Some(1931), Collection::Feature),
    film("Barton_Fink", "CB", true, Some(1991), Collection::Feature),
    film("Belle_de_Jour", "LB", true, Some(1967), Collection::Feature),
    film("Black_Swan", "DA", true, Some(2010), Collection::Feature),
    film("Blood_Simple", "CB", true, Some(1984), Collection::Feature),
    film("Blue_Velvet", "DL", true, Some(1986), Collection::Feature),
    film("Bringing_Up_Baby", "HH", false, Some(1938), Collection::Feature),
    film("Burn_After_Reading", "CB", true, Some(2008), Collection::Feature),
    film("Catch_Me_If_You_Can", "SS", true, Some(2002), Collection::Feature),
    film("Cheyenne_Autumn", "JF", false, Some(1964), Collection::Feature),
    film("Color_Purple", "SS", true, Some(1985), Collection::Feature),
    film("Death_in_the_Garden", "LB", true, Some(1956), Collection::Feature),
    film("Dersu_Uzala", "AK", true, Some(1975), Collection::Feature),
    film("Detective", "JLG", true, Some(1985), Collection::Feature),
    film("Diary_of_a_Country_Priest", "LB", false, Some(1951), Collection::Feature),
    film("Discreet_Charm", "LB", true, Some(1972), Collection::Feature),
    film("Dreams", "AK", true, Some(1990), Collection::Feature),
    film("Drunken_Angel", "AK", false, Some(1948), Collection::Feature),
    film("Duel", "SS", true, Some(1971), Collection::Feature),
    film("Dune", "DL", true, Some(1984), Collection::Feature),
    film("Early_Spring", "YO", false, Some(1956), Collection::Feature),
    film("Early_Summer", "YO", false, Some(1951), Collection::Feature),
    film("Enthusiasm", "other", false, Some(1930), Collection::Feature),
    film("Equinox_Flower", "YO", true, Some(1958), Collection::Feature),
    film("Eraserhead", "DL", false, Some(1977), Collection::Feature),
    film("ET", "SS", true, Some(1982), Collection::Feature),
    film("Exterminating_Angel", "LB", false, Some(1962), Collection::Feature),
    film("Fargo", "CB", true, Some(1996), Collection::Feature),
    film("Fata_Morgana", "other", true, Some(1971), Collection::Feature),
    film("Foreign_Correspondent", "AH", false, Some(1940), Collection::Feature),
    film("Fort_Apache", "JF", true, Some(1948), Collection::Feature),
    film("Frenzy", "AH", true, Some(1972), Collection::Feature),
    film("Gentlemen_Prefer_Blondes", "HH", true, Some(1953), Collection::Feature),
    film("Grapes_of_Wrath", "JF", false, Some(1940), Collection::Feature),
    film("Hangmans_House", "JF", false, Some(1928), Collection::Feature),
    film("High_and_Low", "AK", false, Some(1963), Collection::Feature),
    film("His_Girl_Friday", "HH", false, Some(1940), Collection::Feature),
    film("How_Green_Was_My_Valley", "JF", false, Some(1941), Collection::Feature),
    film("How_to_Survive_a_Plague", "other", true, Some(2012), Collection::Feature),
    film("I_Was_Born_But", "YO", false, Some(1932), Collection::Feature),
    film("In_Praise_of_Love", "JLG", false, Some(2001), Collection::Feature),
    film("Indiana_Jones_and_the_Last_Crusade", "SS", true, Some(1989), Collection::Feature),
    film("Indiana_Jones_and_the_Temple_of_Doom", "SS", true, Some(1984), Collection::Feature),
    film("Inland_Empire", "DL", true, Some(2006), Collection::Feature),
    film("Ivans_Childhood", "AT", false, Some(1962), Collection::Feature),
    film("Jeanne_Dielman", "other", true, Some(1975), Collection::Feature),
    film("Kagemusha", "AK", true, Some(1980), Collection::Feature),
    film("Koyaanisqatsi", "other", true, Some(1982), Collection::Feature),
    film("L_Age_D_Or", "LB", false, Some(1930), Collection::Feature),
    film("Las_Hurdes", "LB", false, Some(1933), Collection::Feature),
    film("Late_Autumn", "YO", true, Some(1960), Collection::Feature),
    film("Late_Spring", "YO", false, Some(1949), Collection::Feature),
    film("Le_Petit_Soldat", "JLG", false, Some(1963), Collection::Feature),
    film("Le_Quattro_Volte", "JLG", true, Some(2010), Collection::Feature),
    film("Les_Dames_du_Bois_de_Boulogne", "other", false, Some(1945), Collection::Feature),
    film("Los_Olvidados", "LB", false, Some(1950), Collection::Feature),
    film("Lost_Highway", "DL", true, Some(1997), Collection::Feature),
    film("Madadayo", "AK", true, Some(1993), Collection::Feature),
    film("Made_in_USA", "JLG", true, Some(1966), Collection::Feature),
    film("Marnie", "AH", true, Some(1964), Collection::Feature),
    film("Meshes_of_the_Afternoon", "other", false, Some(1943), Collection::Feature),
    film("Millers_Crossing", "CB", true, Some(1990), Collection::Feature),
    film("Mother", "other", false, Some(1926), Collection::Feature),
    film("Mr_and_Mrs_Smith", "AH", false, Some(1941), Collection::Feature),
    film("Mulholland_Drive", "DL", true, Some(2001), Collection::Feature),
    film("Munich", "SS", true, Some(2005), Collection::Feature),
    film("My_Darling_Clementine", "JF", false, Some(1946), Collection::Feature),
    film("My_Name_is_Ivan", "other", false, None, Collection::Feature),
    film("Nazarin", "LB", false, Some(1959), Collection::Feature),
    film("No_Blood_Relation", "AH", false, Some(1932), Collection::Feature),
    film("North_by_Northwest", "AH", true, Some(1959), Collection::Feature),
    film("Notorious", "AH", false, Some(1946), Collection::Feature),
    film("Notre_Musique", "JLG", true, Some(2004), Collection::Feature),
    film("O_Brother_Where_Art_Thou", "CB", true, Some(2000), Collection::Feature),
    film("Only_Angels_Have_Wings", "HH", false, Some(1939), Collection::Feature),
    film("Passing_Fancy", "other", false, None, Collection::Feature),
    film("Pi", "DA", false, Some(1998), Collection::Feature),
    film("Pierrot_le_Fou", "JLG", true, Some(1965), Collection::Feature),
    film("Psycho", "AH", false, Some(1960), Collection::Feature),
    film("Raiders_of_the_Lost_Ark", "SS", true, Some(1981), Collection::Feature),
    film("Raising_Arizona", "CB", true, Some(1987), Collection::Feature),
    film("Ran", "AK", true, Some(1985), Collection::Feature),
    film("Rashomon", "AK", false, Some(1950), Collection::Feature),
    film("Rear_Window", "AH", true, Some(1954), Collection::Feature),
    film("Rebecca", "AH", false, Some(1940), Collection::Feature),
    film("Requiem_for_a_Dream", "DA", true, Some(2000), Collection::Feature),
    film("Rio_Bravo", "HH", true, Some(1959), Collection::Feature),
    film("Robinson_Crusoe", "LB", true, Some(1954), Collection::Feature),
    film("Rope", "AH", true, Some(1948), Collection::Feature),
    film("Saving_Private_Ryan", "SS", true, Some(1998), Collection::Feature),
    film("Schindlers_List", "SS", true, Some(1993), Collection::Feature),
    film("Seven_Samurai", "AK", true, Some(1954), Collection::Feature),
    film("Shadow_of_a_Doubt", "AH", false, Some(1943), Collection::Feature),
    film("Soigne_ta_Droite", "JLG", true, Some(1987), Collection::Feature),
    film("Stagecoach", "JF", false, Some(1939), Collection::Feature),
    film("Straight_Story", "DL", true, Some(1999), Collection::Feature),
    film("Strangers_on_a_Train", "AH", false, Some(1951), Collection::Feature),
    film("Sullivans_Travels", "AH", false, Some(1941), Collection::Feature),
    film("That_Obscure_Object_of_Desire", "LB", true, Some(1977), Collection::Feature),
    film("The_39_Steps", "AH", false, Some(1939), Collection::Feature),
    film("The_Big_Lebowski", "CB", true, Some(1998), Collection::Feature),
    film("The_Big_Sleep", "HH", false, Some(1946), Collection::Feature),
    film("The_Birds", "AH", true, Some(1963), Collection::Feature),
    film("The_End_of_Summer", "YO", true, Some(1961), Collection::Feature),
    film("The_Fountain", "DA", true, Some(2006), Collection::Feature),
    film("The_Hidden_Fortress", "AK", false, Some(1958), Collection::Feature),
    film("The_Hudsucker_Proxy", "CB", true, Some(1994), Collection::Feature),
    film("The_Lady_Vanishes", "AH", false, Some(1938), Collection::Feature),
    film("The_Man_Who_Knew_Too_Much", "AH", true, Some(1956), Collection::Feature),
    film("The_Man_Who_Shot_Liberty_Valence", "JF", false, Some(1962), Collection::Feature),
    film("The_Milky_Way", "JLG", true, Some(1969), Collection::Feature),
    film("The_Mirror", "AT", false, Some(1975), Collection::Feature),
    film("The_Phantom_of_Liberty", "JLG", true, Some(1974), Collection::Feature),
    film("The_Pleasure_Garden", "AH", false, Some(1925), Collection::Feature),
    film("The_Quiet_Man", "JF", true, Some(1952), Collection::Feature),
    film("The_Sacrifice", "AT", true, Some(1986), Collection::Feature),
    film("The_Searchers", "JF", true, Some(1956), Collection::Feature),
    film("The_Wrestler", "DA", true, Some(2008), Collection::Feature),
    film("The_Wrong_Man", "AH", false, Some(1956), Collection::Feature),
    film("Throne_of_Blood", "AK", false, Some(1957), Collection::Feature),
    film("Tokyo_Chorus", "YO", false, Some(1931), Collection::Feature),
    film("Tokyo_Story", "YO", false, Some(1953), Collection::Feature),
    film("Tokyo_Twilight", "YO", false, Some(1957), Collection::Feature),
    film("Torn_Curtain", "AH", true, Some(1966), Collection::Feature),
    film("Tout_Va_Bien", "JLG", true, Some(1972), Collection::Feature),
    film("Tristana", "LB", true, Some(1970), Collection::Feature),
    film("Twin_Peaks", "DL", true, Some(1990), Collection::Feature),
    film("Twin_Peaks_Ep1", "DL", true, Some(1992), Collection::Feature),
    film("Un_Chien_Andalou", "LB", false, Some(1929), Collection::Feature),
    film("Uncle_Boonme_Who_Can_Recall_His_Past_Lives", "other", true, Some(2010), Collection::Feature),
    film("Vampyr", "other", false, Some(1932), Collection::Feature),
    film("Vertigo", "AH", true, Some(1958), Collection::Feature),
    film("Viridiana", "LB", false, Some(1961), Collection::Feature),
    film("War_Horse", "SS", true, Some(2011), Collection::Feature),
    film("Weekend", "JLG", true, Some(1967), Collection::Feature),
    film("Wild_at_Heart", "DL", true, Some(1990), Collection::Feature),
    film("Young_Mr_Lincoln", "JF", true, Some(1939), Collection::Feature),
    film("About_Russian_Ark", "", true, None, Collection::Documentary),
    film("Andrei", "", true, None, Collection::Documentary),
    film("CHRONICLE_OF_A_SUMMER", "", true, None, Collection::Documentary),
    film("ELEGY_OF_MOSCOW", "", false, None, Collection::Documentary),
    film("FALL_ROMANOV_DYNASTY", "", false, None, Collection::Documentary),
    film("HIROSHIMA_MON_AMOUR", "", false, None, Collection::Documentary),
    film("IN_THE_YEAR_OF_THE_PIG", "", false, None, Collection::Documentary),
    film("IRONHORSE_1924", "JF", false, Some(1924), Collection::Documentary),
    film("IRONHORSE_INTL_0", "JF", false, Some(1924), Collection::Documentary),
    film("LET_THERE_BE_LIGHT", "", false, None, Collection::Documentary),
    film("Murrow_Harvest", "", false, Some(1960), Collection::Documentary),
    film("NANOOK", "", false, None, Collection::Documentary),
    film("NOSTALGHIA", "", false, None, Collection::Documentary),
    film("Primary_1960", "", false, None, Collection::Documentary),
    film("Primary_Long_1960", "", false, None, Collection::Documentary),
    film("RUSSIAN_ARK", "", false, None, Collection::Documentary),
    film("SACRIFICE", "", false, None, Collection::Documentary),
    film("SHOAH_part1", "", false, None, Collection::Documentary),
    film("STEAMROLLER_AND_VIOLIN", "", false, None, Collection::Documentary),
    film("SYMBIOPSYCHOTAXIPLASM", "", false, None, Collection::Documentary),
    film("SYMBIOPSYCHOTAXIPLASM_2", "", false, None, Collection::Documentary),
    film("THE_MAN_WITH_THE_MOVIE_CAMERA", "", false, None, Collection::Documentary),
    film("A_Strange_Meeting_1909", "other", false, Some(1909), Collection::PaperPrint),
    film("At_the_Altar_1909", "other", false, Some(1909), Collection::PaperPrint),
    film("Cord_of_Life_1909", "other", false, Some(1909), Collection::PaperPrint),
    film("Fools_of_Fate_1909", "other", false, Some(1909), Collection::PaperPrint),
    film("Four_Sons_1928", "other", false, Some(1928), Collection::PaperPrint),
    film("Goddess_of_Sagebrush_Gulch_1912", "other", false, Some(1912), Collection::PaperPrint),
    film("Married_for_Millions", "other", false, Some(1906), Collection::PaperPrint),
    film("Sherlock_Holmes_Baffled_1900", "other", false, Some(1900), Collection::PaperPrint),
    film("The_Light_That_Came_1909", "other", false, Some(1909), Collection::PaperPrint),
    film("The_Necklace_1909", "other", false, Some(1909), Collection::PaperPrint),
    film("The_Restoration_1909", "other", false, Some(1909), Collection::PaperPrint),
    film("The_Tramp_and_the_Muscular_Cook_1898", "other", false, Some(1898), Collection::PaperPrint),
    film("The_Two_Paths_1911", "other", false, Some(1911), Collection::PaperPrint),
    film("Whats_Your_Hurry_1909", "other", false, Some(1909), Collection::PaperPrint),
    film("Who_Pays_for_the_Drinks_1903", "other", false, Some(1903), Collection::PaperPrint),
    film("Winning_Back_His_Love_1910", "other", false, Some(1910), Collection::PaperPrint),
    film("With_the_Enemys_Help_1912", "other", false, Some(1912), Collection::PaperPrint),
];

/// Looks up a film by title
pub fn film_entry(title: &str) -> Option<&'static FilmEntry> {
    FILMS.iter().find(|f| f.title == title)
}

/// Full name for a director code
pub fn director_name(code: &str) -> Option<&'static str> {
    DIRECTORS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Director codes, sorted
pub fn available_directors() -> Vec<&'static str> {
    let mut codes: Vec<&'static str> = DIRECTORS.iter().map(|(c, _)| *c).collect();
    codes.sort_unstable();
    codes
}

fn features() -> impl Iterator<Item = &'static FilmEntry> {
    FILMS.iter().filter(|f| f.collection == Collection::Feature)
}

/// Feature films by a director, in catalogue order
pub fn films_for_director(code: &str) -> Vec<&'static str> {
    features()
        .filter(|f| f.director == code)
        .map(|f| f.title)
        .collect()
}

/// Feature films by a director with their release years
pub fn films_for_director_with_year(code: &str) -> Vec<(&'static str, Option<u16>)> {
    features()
        .filter(|f| f.director == code)
        .map(|f| (f.title, f.year))
        .collect()
}

/// Films of any collection released within `years`
pub fn films_for_years(years: RangeInclusive<u16>) -> Vec<&'static str> {
    FILMS
        .iter()
        .filter(|f| f.year.is_some_and(|y| years.contains(&y)))
        .map(|f| f.title)
        .collect()
}

pub fn black_and_white_films() -> Vec<&'static str> {
    features().filter(|f| !f.color).map(|f| f.title).collect()
}

pub fn color_films() -> Vec<&'static str> {
    features().filter(|f| f.color).map(|f| f.title).collect()
}

/// Groups the feature films of the given directors by director code
pub fn analysis_pool(
    directors: &[&str],
    filter: ColorFilter,
) -> BTreeMap<&'static str, BTreeSet<&'static str>> {
    let mut pool: BTreeMap<&'static str, BTreeSet<&'static str>> = BTreeMap::new();
    for entry in features() {
        if filter.accepts(entry) && directors.contains(&entry.director) {
            pool.entry(entry.director).or_default().insert(entry.title);
        }
    }
    pool
}
