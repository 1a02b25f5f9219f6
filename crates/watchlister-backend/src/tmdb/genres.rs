/// Provider genre ids, shared between movie and TV discovery.
pub const GENRES: [(u32, &str); 19] = [
    (28, "Action"),
    (12, "Adventure"),
    (16, "Animation"),
    (35, "Comedy"),
    (80, "Crime"),
    (99, "Documentary"),
    (18, "Drama"),
    (10751, "Family"),
    (14, "Fantasy"),
    (36, "History"),
    (27, "Horror"),
    (10402, "Music"),
    (9648, "Mystery"),
    (10749, "Romance"),
    (878, "Sci-Fi"),
    (10770, "TV Movie"),
    (53, "Thriller"),
    (10752, "War"),
    (37, "Western"),
];

pub fn genre_name_for_id(id: u32) -> Option<&'static str> {
    GENRES.iter().find(|(gid, _)| *gid == id).map(|(_, name)| *name)
}

pub fn genre_id_for_name(name: &str) -> Option<u32> {
    GENRES
        .iter()
        .find(|(_, n)| n.eq_ignore_ascii_case(name))
        .map(|(id, _)| *id)
}
