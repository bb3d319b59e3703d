// Unicode word boundaries.
matiter!(wb1, r"\b", "");
matiter!(wb2, r"\b", "a", (0, 0), (1, 1));
matiter!(wb3, r"\b", "ab", (0, 0), (2, 2));
matiter!(wb4, r"^\b", "ab", (0, 0));
matiter!(wb5, r"\b$", "ab", (2, 2));
matiter!(wb6, r"^\b$", "ab");
matiter!(wb7, r"\bbar\b", "nobar bar foo bar", (6, 9), (14, 17));
matiter!(wb8, r"a\b", "faoa x", (3, 4));
matiter!(wb9, r"\bx\b", "x x x", (0, 1), (2, 3), (4, 5));
matiter!(wb10, r"\b", "δ", (0, 0), (2, 2));
matiter!(wb11, r"\bδ\b", "aδ δb δ", (8, 10));

// Not word boundaries.
matiter!(nb1, r"\Bfoo\B", "n foo xfoox that", (7, 10));
matiter!(nb2, r"a\B", "faoa x", (1, 2));
matiter!(nb3, r"\Bbar", "foobar", (3, 6));
matiter!(nb4, r"\B", "", (0, 0));
matiter!(nb5, r"\B", "x");
matiter!(nb6, r"\B", "  ", (0, 0), (1, 1), (2, 2));
matiter!(nb7, r"\B", "δ");

// ASCII word boundaries treat non-ASCII letters as non-word characters.
matiter!(ascii1, r"(?-u:\b)x(?-u:\b)", "áxβ", (2, 3));
matiter!(ascii2, r"(?-u:\B)x(?-u:\B)", "áxβ");
nomat!(ascii3, r"\bx\b", "áxβ");

// Start and end of words.
matiter!(start1, r"\b{start}", "ab cd", (0, 0), (3, 3));
matiter!(start2, r"\<", "ab cd", (0, 0), (3, 3));
matiter!(end1, r"\b{end}", "ab cd", (2, 2), (5, 5));
matiter!(end2, r"\>", "ab cd", (2, 2), (5, 5));
matiter!(start_end_word, r"\<\w+\>", "ab, cd!", (0, 2), (4, 6));
nomat!(start_not_inside, r"a\<b", "ab");
nomat!(end_not_before, r"\>a", "a");

// Half boundaries only look at one side.
matiter!(start_half1, r"\b{start-half}", "ab c", (0, 0), (3, 3));
matiter!(end_half1, r"\b{end-half}", "ab c", (2, 2), (4, 4));
mat!(start_half_digit, r"\b{start-half}\d+", "x12 34", Some((4, 6)));
mat!(end_half_digit, r"\d+\b{end-half}", "12x 34", Some((4, 6)));

// A special boundary name that isn't a word falls back to a counted
// repetition of the boundary.
mat!(boundary_counted, r"\b{2}x", "x", Some((0, 1)));
