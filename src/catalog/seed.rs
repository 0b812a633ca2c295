//! Embedded reference corpus. MovieLens identifiers, two-decimal mean
//! ratings, short plot summaries written for retrieval.

use super::{MovieId, MovieRecord};

fn movie(
    id: MovieId,
    title: &str,
    year: i32,
    avg_rating: f32,
    genres: &[&str],
    plot: &str,
) -> MovieRecord {
    MovieRecord {
        id,
        title: title.to_string(),
        year,
        genres: genres.iter().map(|g| g.to_string()).collect(),
        avg_rating,
        plot: plot.to_string(),
    }
}

pub fn seed_catalog() -> Vec<MovieRecord> {
    vec![
        movie(
            1,
            "Toy Story",
            1995,
            3.92,
            &["Animation", "Children", "Comedy"],
            "Toys come alive when humans leave the room. Cowboy doll Woody feels \
             threatened when astronaut action figure Buzz Lightyear becomes the \
             new favorite toy of the boy who owns them.",
        ),
        movie(
            2,
            "Jumanji",
            1995,
            3.21,
            &["Adventure", "Children", "Fantasy"],
            "Two children find a magical board game whose jungle dangers escape \
             into the real world with every roll, along with a man trapped \
             inside the game for decades.",
        ),
        movie(
            6,
            "Heat",
            1995,
            3.95,
            &["Action", "Crime", "Thriller"],
            "A disciplined career thief planning one last heist is hunted across \
             Los Angeles by an obsessive homicide detective.",
        ),
        movie(
            110,
            "Braveheart",
            1995,
            4.03,
            &["Action", "Drama", "War"],
            "A thirteenth-century Scottish farmer leads an uprising against \
             English rule after the murder of his wife.",
        ),
        movie(
            150,
            "Apollo 13",
            1995,
            3.85,
            &["Adventure", "Drama"],
            "An oxygen tank explosion cripples a moon mission, and astronauts \
             and ground control improvise a desperate plan to bring the crew \
             home alive.",
        ),
        movie(
            296,
            "Pulp Fiction",
            1994,
            4.20,
            &["Comedy", "Crime", "Drama", "Thriller"],
            "Interlocking stories of two hitmen, a boxer, and a gangster's wife \
             cross paths in Los Angeles, told out of order.",
        ),
        movie(
            318,
            "The Shawshank Redemption",
            1994,
            4.43,
            &["Crime", "Drama"],
            "A banker sentenced to life for murdering his wife forms a decades \
             long friendship inside prison while quietly working toward an \
             escape.",
        ),
        movie(
            356,
            "Forrest Gump",
            1994,
            4.16,
            &["Comedy", "Drama", "Romance", "War"],
            "A slow-witted but kind man from Alabama drifts through decades of \
             American history, touching wars, fortunes, and the woman he loves.",
        ),
        movie(
            364,
            "The Lion King",
            1994,
            4.15,
            &["Animation", "Children", "Drama", "Musical"],
            "A young lion cub flees the pride lands after his father the king is \
             murdered, and must return to claim his place as king.",
        ),
        movie(
            480,
            "Jurassic Park",
            1993,
            3.75,
            &["Action", "Adventure", "Sci-Fi", "Thriller"],
            "Cloned dinosaurs break loose in an island theme park, turning a \
             preview tour into a fight for survival.",
        ),
        movie(
            541,
            "Blade Runner",
            1982,
            4.10,
            &["Action", "Sci-Fi", "Thriller"],
            "A weary detective hunts escaped artificial humans through a rain \
             soaked future Los Angeles and begins to question what is human.",
        ),
        movie(
            589,
            "Terminator 2: Judgment Day",
            1991,
            3.93,
            &["Action", "Sci-Fi"],
            "A reprogrammed killing machine is sent back in time to protect a \
             boy from a shapeshifting assassin built to end the future \
             resistance.",
        ),
        movie(
            593,
            "The Silence of the Lambs",
            1991,
            4.16,
            &["Crime", "Horror", "Thriller"],
            "A young FBI trainee seeks the counsel of an imprisoned cannibal \
             psychiatrist to catch a serial killer.",
        ),
        movie(
            858,
            "The Godfather",
            1972,
            4.29,
            &["Crime", "Drama"],
            "The aging patriarch of a New York crime family transfers control of \
             his empire to his reluctant youngest son.",
        ),
        movie(
            1214,
            "Alien",
            1979,
            4.06,
            &["Horror", "Sci-Fi"],
            "The crew of a commercial space freighter answers a distress signal \
             and brings a lethal organism aboard.",
        ),
        movie(
            1270,
            "Back to the Future",
            1985,
            3.94,
            &["Adventure", "Comedy", "Sci-Fi"],
            "A teenager is accidentally sent thirty years into the past in a \
             time traveling car and must make his parents fall in love.",
        ),
        movie(
            1721,
            "Titanic",
            1997,
            3.89,
            &["Drama", "Romance"],
            "A penniless artist and a first-class passenger fall in love aboard \
             an ocean liner that sinks after hitting an iceberg on its maiden \
             voyage.",
        ),
        movie(
            2571,
            "The Matrix",
            1999,
            4.32,
            &["Action", "Sci-Fi", "Thriller"],
            "A computer hacker discovers that reality is a simulation built by \
             machines and joins a rebellion to free humanity.",
        ),
        movie(
            3578,
            "Gladiator",
            2000,
            3.97,
            &["Action", "Adventure", "Drama"],
            "A betrayed Roman general is sold into slavery and fights his way \
             through the arena to avenge his family.",
        ),
        movie(
            5618,
            "Spirited Away",
            2001,
            4.21,
            &["Animation", "Adventure", "Fantasy"],
            "A girl wanders into a world of spirits and must work in a \
             bathhouse to free her parents, who have been turned into pigs.",
        ),
        movie(
            6377,
            "Finding Nemo",
            2003,
            3.96,
            &["Adventure", "Animation", "Children", "Comedy"],
            "An anxious clownfish crosses the ocean to find his captured son, \
             helped by a forgetful blue tang.",
        ),
        movie(
            58559,
            "The Dark Knight",
            2008,
            4.24,
            &["Action", "Crime", "Drama", "Thriller"],
            "A vigilante, a police lieutenant, and a district attorney face an \
             anarchist criminal who wants to watch the city burn.",
        ),
        movie(
            72998,
            "Avatar",
            2009,
            3.57,
            &["Action", "Adventure", "Sci-Fi"],
            "A paraplegic marine inhabits an alien body on a distant moon and \
             sides with its natives against the corporation strip mining their \
             home.",
        ),
        movie(
            79132,
            "Inception",
            2010,
            4.07,
            &["Action", "Sci-Fi", "Thriller"],
            "A thief who enters people's dreams to steal secrets is offered a \
             chance to erase his past if he can plant an idea deep inside a \
             target's mind.",
        ),
        movie(
            109487,
            "Interstellar",
            2014,
            4.02,
            &["Adventure", "Drama", "Sci-Fi"],
            "As crops fail on a dying Earth, explorers travel through a \
             wormhole in search of a new home for humanity.",
        ),
    ]
}
