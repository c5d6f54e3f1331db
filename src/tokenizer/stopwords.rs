/// Closed English stopword list
///
/// Words shorter than the minimum token length are filtered anyway, but the
/// short entries stay so the list remains usable with a lower minimum.
pub const ENGLISH: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and",
    "another", "any", "are", "aren", "as", "at", "back", "be", "because", "been", "before",
    "being", "below", "between", "both", "but", "by", "came", "can", "cannot", "come", "could",
    "couldn", "did", "didn", "do", "does", "doesn", "doing", "don", "down", "during", "each",
    "even", "ever", "every", "few", "for", "from", "further", "get", "gets", "got", "had",
    "hadn", "has", "hasn", "have", "haven", "having", "he", "her", "here", "hers", "herself",
    "him", "himself", "his", "how", "however", "i", "if", "in", "into", "is", "isn", "it",
    "its", "itself", "just", "like", "make", "many", "may", "me", "might", "more", "most",
    "much", "must", "my", "myself", "never", "no", "nor", "not", "now", "of", "off", "on",
    "once", "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "said",
    "same", "see", "she", "should", "shouldn", "since", "so", "some", "still", "such", "take",
    "than", "that", "the", "their", "theirs", "them", "themselves", "then", "there", "these",
    "they", "this", "those", "through", "to", "too", "under", "until", "up", "upon", "us",
    "very", "was", "wasn", "way", "we", "well", "were", "weren", "what", "when", "where",
    "whether", "which", "while", "who", "whom", "whose", "why", "will", "with", "within",
    "without", "won", "would", "wouldn", "yet", "you", "your", "yours", "yourself",
    "yourselves",
];
