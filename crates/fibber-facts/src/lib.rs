//! The built-in grammar: random facts about cats.
//!
//! The grammar is data as far as the rest of the system is concerned. It is
//! compiled once per literal encoding into a process-wide read-only
//! [`Program`]; sessions share these instances freely.

use std::sync::LazyLock;

use fibber_bytecode::{pick, seq, Program, ProgramBuilder, Term};
use fibber_deflate::Encoding;

#[cfg(test)]
mod lib_tests;

static PACKED: LazyLock<Program> = LazyLock::new(|| build(Encoding::Packed));
static PLAIN: LazyLock<Program> = LazyLock::new(|| build(Encoding::Plain));

/// The grammar compiled for the gzip output path.
pub fn packed() -> &'static Program {
    &PACKED
}

/// The grammar compiled for the raw text output path.
pub fn plain() -> &'static Program {
    &PLAIN
}

/// Compile the grammar for one literal encoding.
pub fn build(encoding: Encoding) -> Program {
    let mut b = ProgramBuilder::new(encoding);

    let authority = pick![b;
        "Dr Whiskerton",
        "Professor Pounce",
        "the Mayor of Catford",
        "Captain Mittens",
    ];
    let book = pick![b;
        "Everything Cats",
        "A Field Guide to Indoor Tigers",
        "1001 Entirely True Cat Facts",
    ];
    let regional = pick![b;
        "Royal",
        "National",
        "International",
        "Interplanetary",
        "Backyard",
    ];
    let organisation = pick![b;
        seq![b; "the ", regional, " Cat Fanciers' Society"],
        seq![b; "the ", regional, " Feline Institute"],
        seq![b; "the ", regional, " Cat Appreciation League"],
    ];
    let credential = pick![b;
        seq![b; ", author of “", book, "”"],
        seq![b; ", founder of ", organisation],
    ];
    let front_authority = pick![b;
        seq![b; "According to ", authority, ", "],
        seq![b; authority, credential, " says, "],
    ];
    let attestation = pick![b; ", according to ", ", says ", ", writes "];
    let back_authority = pick![b;
        "",
        seq![b; attestation, authority],
        seq![b; attestation, authority, credential],
    ];
    let preamble = pick![b; "Did you know, ", "Fun fact: ", front_authority];

    let breed = pick![b; "brown cats", "blue cats", "tigers", "house cats"];
    let ability = pick![b;
        " can jump as high as ",
        " can hear better than ",
        " are faster than ",
        " tell funnier jokes than ",
    ];
    let reference = pick![b; "goats", "a weather balloon", breed, authority];
    let can_be = pick![b;
        "toilet trained",
        "taller than a spaniel",
        "surprisingly patient",
        "president",
    ];

    let body_part = pick![b; "tail", "paw", "ear", "whisker", "elbow", "knee", "chin"];
    let occupation = pick![b; "superhero", "astronaut", "detective", "napper", "chef", "artist"];
    let verb_ing = pick![b; "meowing", "purring", "staring", "napping", "ignoring", "chirping"];
    let plural_noun = pick![b; "dogs", "squirrels", "muffins", "birds", "mice", "insects"];
    let funny_noun = pick![b; "disco", "spaghetti", "pickle", "volcano", "noodle"];
    let trend = pick![b;
        "sourdough",
        "cryptocurrency",
        "social media",
        "vintage vinyl records",
    ];
    let weird_sound = pick![b; "honk", "kazoo", "squawk", "boing"];
    let emotion = pick![b; "joy", "surprise", "pride", "stress", "curiosity", "calm"];
    let animal = pick![b; "cheetah", "rabbit", "squirrel", "giraffe", "kangaroo"];
    let thing = pick![b; "mouse", "toy", "treat", "ball"];
    let scent = pick![b; "lavender", "cinnamon", "fresh bread", "wet grass"];
    let colour = pick![b; "blue", "green", "yellow", "amber"];
    let feature = pick![b; "fluffy tails", "big ears", "extra toes", "green eyes"];

    let comment = pick![b;
        "",
        "",
        "",
        "  Wowee!",
        "  Mee-ow!",
        "  Luckily no domestic cat has ever achieved this.",
        "  Just like people!",
    ];
    // Rare parenthetical; the gate cuts the clause, never the newline.
    let verified = seq![b; Term::Gate(0x3000), "  (Independently verified.)"];
    let tail = seq![b; ".", comment, verified, "\n"];

    let fact = pick![b;
        seq![b; breed, ability, reference, back_authority, tail],
        seq![b; breed, " can be ", can_be, back_authority, tail],
        seq![b; preamble, breed, ability, reference, "!!", comment, "\n"],
        seq![b; "A cat can jump up to ", Term::Int(2, 40), " times its own ", body_part, " in height!\n"],
        seq![b; "The average cat sleeps about ", Term::Int(12, 22), " hours a day, basically a full-time ", occupation, tail],
        seq![b; "Cats communicate by ", verb_ing, " with humans, but rarely with ", plural_noun, tail],
        seq![b; "A group of cats is technically called a ", funny_noun, ", which also sounds like a hipster band name.\n"],
        seq![b; "The oldest cat on record reached ", Term::Int(25, 41), " and had strong opinions about ", trend, tail],
        seq![b; "Cats can make over ", Term::Int(60, 120), " distinct sounds, including the occasional ", weird_sound, tail],
        seq![b; "A cat’s nose print is as unique as a human ", body_part, ", making every boop special.\n"],
        seq![b; "When a cat shows its belly, it could mean trust, or it could be a trap to test your ", emotion, tail],
        seq![b; "The average cat can sprint at ", Term::Int(20, 34), " miles per hour, to the lasting embarrassment of the ", animal, tail],
        seq![b; "A cat’s whiskers are sensitive enough to find a ", thing, " in total darkness", back_authority, tail],
        seq![b; "Some cats can rotate their ears a full ", Term::Int(160, 200), " degrees", back_authority, tail],
        seq![b; "There are more than ", Term::Int(40, 90), " recognised breeds of domestic cat, each with its own ", feature, tail],
        seq![b; "Cat fur is self-cleaning and smells faintly of ", scent, ", says “", book, "”.\n"],
        seq![b; "Some cats have heterochromia, meaning each eye is a different ", colour, tail],
        seq![b; "In ancient Egypt, ", verb_ing, " at a cat was frowned upon by law", back_authority, tail],
        seq![b; "Kittens practise ", verb_ing, " on ", plural_noun, " before trying it on people", tail],
    ];

    b.finish(fact).expect("cat-fact grammar is well-formed")
}
