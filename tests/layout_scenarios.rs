//! Layout scenarios: scores built in code, checked against the geometry the
//! engine produces with default options.

use pretty_assertions::assert_eq;
use scorelayout::layout::curves::Curve;
use scorelayout::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ── Builders ──

fn pitched(step: Step, octave: i32, duration: i32, note_type: NoteType) -> Note {
    Note {
        duration: Some(duration),
        pitch: Some(Pitch { step, octave, alter: None }),
        note_type: Some(note_type),
        ..Note::default()
    }
}

fn rest(duration: i32) -> Note {
    Note {
        duration: Some(duration),
        rest: Some(Rest::default()),
        note_type: Some(NoteType::Quarter),
        ..Note::default()
    }
}

fn tie(kind: StartStop) -> Notations {
    Notations {
        ties: vec![Tie { kind }],
        ..Notations::default()
    }
}

fn measure(number: &str, elements: Vec<Element>) -> Measure {
    Measure {
        number: number.into(),
        elements,
    }
}

fn single_part(measures: Vec<Measure>) -> Score {
    Score {
        title: None,
        composer: None,
        parts: vec![Part {
            id: "P1".into(),
            name: None,
            measures,
        }],
    }
}

fn four_four(clef: Clef) -> Element {
    Element::Attributes(Attributes {
        divisions: Some(1),
        time: Some(Time { beats: 4, beat_type: 4 }),
        clefs: vec![clef],
        ..Attributes::default()
    })
}

fn layout(score: &Score) -> ScoreLayout {
    init_logging();
    layout_score(score, &LayoutOptions::default())
}

fn shapes_of<'a>(part: &'a PartLayout, kind: &str) -> Vec<&'a Primitive> {
    part.primitives.iter().filter(|p| p.shape.kind() == kind).collect()
}

fn in_measure<'a>(prims: &[&'a Primitive], measure: usize) -> Vec<&'a Primitive> {
    prims
        .iter()
        .copied()
        .filter(|p| p.key.measure == Some(measure))
        .collect()
}

fn notehead_ys(part: &PartLayout, measure: usize) -> Vec<f64> {
    in_measure(&shapes_of(part, "notehead"), measure)
        .into_iter()
        .filter_map(|p| match p.shape {
            Shape::Notehead { y, .. } => Some(y),
            _ => None,
        })
        .collect()
}

/// C4 quarter, quarter rest, {E4, G4} half chord in one 4/4 measure.
fn quarter_rest_chord() -> Score {
    let mut g4 = pitched(Step::G, 4, 2, NoteType::Half);
    g4.chord = true;
    single_part(vec![measure(
        "1",
        vec![
            four_four(Clef::treble(1)),
            Element::Note(pitched(Step::C, 4, 1, NoteType::Quarter)),
            Element::Note(rest(1)),
            Element::Note(pitched(Step::E, 4, 2, NoteType::Half)),
            Element::Note(g4),
        ],
    )])
}

// ═══════════════════════════════════════════════════════════════════════
// Spacing and chord groups
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn quarter_rest_and_half_chord() {
    let score = quarter_rest_chord();
    assert_eq!(score.measure_count(), 1);
    let result = layout(&score);
    assert!(result.issues.is_empty(), "unexpected issues: {:?}", result.issues);

    let part = &result.parts[0];
    // Prefix: clef 32 + no key + time 24, after the 50px left margin.
    assert_eq!(part.measures, vec![MeasureSpan {
        index: 0,
        number: "1".into(),
        x: 106.0,
        width: 160.0,
    }]);
    assert_eq!(result.width, 106.0 + 160.0 + 30.0);
    assert_eq!(result.height, 180.0);

    let advances: Vec<f64> = part.chords.iter().map(|c| c.advance).collect();
    assert_eq!(advances, vec![40.0, 40.0, 80.0]);
    let xs: Vec<f64> = part.chords.iter().map(|c| c.x).collect();
    assert_eq!(xs, vec![116.0, 156.0, 196.0]);
    let members: Vec<Vec<usize>> = part.chords.iter().map(|c| c.members.clone()).collect();
    assert_eq!(members, vec![vec![1], vec![2], vec![3, 4]]);

    // The chord is keyed by its head element: two heads, one stem.
    let chord_prims: Vec<&Primitive> = part
        .primitives
        .iter()
        .filter(|p| p.key.measure == Some(0) && p.key.element == Some(3))
        .collect();
    let heads = chord_prims.iter().filter(|p| p.shape.kind() == "notehead").count();
    let stems: Vec<&Shape> = chord_prims
        .iter()
        .filter(|p| p.shape.kind() == "stem")
        .map(|p| &p.shape)
        .collect();
    assert_eq!(heads, 2);
    assert_eq!(stems, vec![&Shape::Stem { x: 201.0, y1: 100.0, y2: 55.0, width: 1.0 }]);

    assert_eq!(shapes_of(part, "rest").len(), 1);
    // C4 needs the first ledger line below the staff.
    let ledgers = shapes_of(part, "ledger-line");
    assert_eq!(ledgers.len(), 1);
    assert_eq!(ledgers[0].key.element, Some(1));
    println!("✓ {} primitives", part.primitives.len());
}

#[test]
fn last_measure_closes_with_final_barline() {
    let result = layout(&quarter_rest_chord());
    let part = &result.parts[0];
    let closing: Vec<&Shape> = in_measure(&shapes_of(part, "barline"), 0)
        .into_iter()
        .filter(|p| p.key.element.is_none())
        .map(|p| &p.shape)
        .collect();
    assert_eq!(
        closing,
        vec![
            &Shape::Barline { x: 260.5, y1: 60.0, y2: 100.0, width: 1.0, style: BarStyle::LightHeavy },
            &Shape::Barline { x: 264.5, y1: 60.0, y2: 100.0, width: 3.0, style: BarStyle::LightHeavy },
        ]
    );
}

#[test]
fn measure_width_is_linear_in_beats() {
    let width_for = |beats: i32, divisions: i32| {
        let score = single_part(vec![measure(
            "1",
            vec![Element::Attributes(Attributes {
                divisions: Some(divisions),
                time: Some(Time { beats, beat_type: 4 }),
                ..Attributes::default()
            })],
        )]);
        layout(&score).parts[0].measures[0].width
    };
    assert_eq!(width_for(3, 1), 120.0);
    assert_eq!(width_for(6, 1), 240.0);
    assert_eq!(width_for(3, 8), 120.0);
    assert_eq!(width_for(6, 8), 240.0);
}

#[test]
fn parts_share_columns_and_stack_by_staff_count() {
    let piano = Part {
        id: "P1".into(),
        name: Some("Piano".into()),
        measures: vec![measure(
            "1",
            vec![
                Element::Attributes(Attributes {
                    divisions: Some(1),
                    staves: Some(2),
                    clefs: vec![Clef::treble(1), Clef::bass(2)],
                    ..Attributes::default()
                }),
                Element::Note(pitched(Step::C, 5, 4, NoteType::Whole)),
            ],
        )],
    };
    let flute = Part {
        id: "P2".into(),
        name: Some("Flute".into()),
        measures: vec![measure(
            "1",
            vec![
                Element::Attributes(Attributes {
                    key: Some(Key { fifths: 1 }),
                    ..Attributes::default()
                }),
                Element::Note(pitched(Step::G, 4, 4, NoteType::Whole)),
            ],
        )],
    };
    let score = Score {
        title: Some("Duet".into()),
        composer: None,
        parts: vec![piano, flute],
    };
    let result = layout(&score);

    assert_eq!(result.parts[0].y, 60.0);
    assert_eq!(result.parts[0].staves, 2);
    assert_eq!(result.parts[1].y, 300.0);
    assert_eq!(result.height, 420.0);
    // One sharp widens the shared prefix for both parts.
    assert_eq!(result.parts[0].measures[0].x, 50.0 + 32.0 + 16.0 + 24.0);
    assert_eq!(result.parts[0].measures[0].x, result.parts[1].measures[0].x);
    assert_eq!(shapes_of(&result.parts[1], "key-accidental").len(), 1);
    assert_eq!(shapes_of(&result.parts[0], "key-accidental").len(), 0);
}

#[test]
fn grand_staff_chord_spans_both_staves() {
    let mut low = pitched(Step::A, 3, 1, NoteType::Quarter);
    low.chord = true;
    low.staff = Some(2);
    let score = single_part(vec![measure(
        "1",
        vec![
            Element::Attributes(Attributes {
                divisions: Some(1),
                staves: Some(2),
                clefs: vec![Clef::treble(1), Clef::bass(2)],
                ..Attributes::default()
            }),
            Element::Note(pitched(Step::G, 4, 1, NoteType::Quarter)),
            Element::Note(low),
        ],
    )]);
    let result = layout(&score);
    assert!(result.issues.is_empty(), "unexpected issues: {:?}", result.issues);
    let part = &result.parts[0];

    // G4 on the treble staff, A3 on the top line of the bass staff at 180.
    assert_eq!(notehead_ys(part, 0), vec![90.0, 180.0]);
    assert!(shapes_of(part, "ledger-line").is_empty());
    let stems: Vec<&Shape> = shapes_of(part, "stem").into_iter().map(|p| &p.shape).collect();
    assert_eq!(stems, vec![&Shape::Stem { x: 121.0, y1: 180.0, y2: 55.0, width: 1.0 }]);
}

// ═══════════════════════════════════════════════════════════════════════
// Context changes
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn clef_change_uses_bass_positions() {
    let score = single_part(vec![
        measure(
            "1",
            vec![
                four_four(Clef::treble(1)),
                Element::Note(pitched(Step::C, 4, 4, NoteType::Whole)),
            ],
        ),
        measure(
            "2",
            vec![
                Element::Attributes(Attributes {
                    clefs: vec![Clef::bass(1)],
                    ..Attributes::default()
                }),
                Element::Note(pitched(Step::C, 4, 2, NoteType::Half)),
                Element::Note(pitched(Step::D, 3, 2, NoteType::Half)),
            ],
        ),
    ]);
    let result = layout(&score);
    let part = &result.parts[0];

    // Treble: C4 on the ledger line below. Bass: C4 on the ledger line
    // above, D3 on the middle line.
    assert_eq!(notehead_ys(part, 0), vec![110.0]);
    assert_eq!(notehead_ys(part, 1), vec![50.0, 80.0]);

    let clefs: Vec<(Option<usize>, ClefSign)> = shapes_of(part, "clef")
        .into_iter()
        .filter_map(|p| match p.shape {
            Shape::Clef { sign, .. } => Some((p.key.measure, sign)),
            _ => None,
        })
        .collect();
    assert_eq!(clefs, vec![(None, ClefSign::G), (Some(1), ClefSign::F)]);
}

#[test]
fn key_change_cancels_old_accidentals() {
    let score = single_part(vec![
        measure(
            "1",
            vec![
                Element::Attributes(Attributes {
                    key: Some(Key { fifths: 3 }),
                    ..Attributes::default()
                }),
                Element::Note(pitched(Step::A, 4, 4, NoteType::Whole)),
            ],
        ),
        measure(
            "2",
            vec![
                Element::Attributes(Attributes {
                    key: Some(Key { fifths: 1 }),
                    ..Attributes::default()
                }),
                Element::Note(pitched(Step::G, 4, 4, NoteType::Whole)),
            ],
        ),
    ]);
    let result = layout(&score);
    let changed: Vec<AccidentalValue> = in_measure(&shapes_of(&result.parts[0], "key-accidental"), 1)
        .into_iter()
        .filter_map(|p| match p.shape {
            Shape::KeyAccidental { accidental, .. } => Some(accidental),
            _ => None,
        })
        .collect();
    assert_eq!(
        changed,
        vec![AccidentalValue::Natural, AccidentalValue::Natural, AccidentalValue::Sharp]
    );
}

#[test]
fn percussion_staff_places_display_positions() {
    let drum = |step: Step, octave: i32| Note {
        duration: Some(2),
        unpitched: Some(Unpitched { display_step: step, display_octave: octave }),
        note_type: Some(NoteType::Half),
        notehead: Some(NoteheadValue::X),
        ..Note::default()
    };
    let percussion = Clef {
        staff: 1,
        sign: ClefSign::Percussion,
        line: None,
        octave_change: None,
    };
    let score = single_part(vec![measure(
        "1",
        vec![
            four_four(percussion),
            Element::Note(drum(Step::E, 4)),
            Element::Note(drum(Step::F, 5)),
        ],
    )]);
    let result = layout(&score);
    assert!(result.issues.is_empty(), "unexpected issues: {:?}", result.issues);
    let part = &result.parts[0];

    // E4 on the bottom line, F5 on the top line.
    assert_eq!(notehead_ys(part, 0), vec![100.0, 60.0]);
    assert!(part.primitives.iter().any(|p| p.shape
        == Shape::Notehead { x: 196.0, y: 60.0, shape: NoteheadValue::X, filled: false }));
    assert!(shapes_of(part, "key-accidental").is_empty());
    assert!(matches!(
        shapes_of(part, "clef")[0].shape,
        Shape::Clef { sign: ClefSign::Percussion, .. }
    ));
}

// ═══════════════════════════════════════════════════════════════════════
// Ties
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn tie_joins_start_and_stop() {
    let mut first = pitched(Step::C, 5, 2, NoteType::Half);
    first.notations = tie(StartStop::Start);
    let mut second = pitched(Step::C, 5, 2, NoteType::Half);
    second.notations = tie(StartStop::Stop);
    let score = single_part(vec![measure(
        "1",
        vec![Element::Note(first), Element::Note(second)],
    )]);
    let result = layout(&score);
    assert!(result.issues.is_empty(), "unexpected issues: {:?}", result.issues);

    let ties = shapes_of(&result.parts[0], "tie-curve");
    assert_eq!(ties.len(), 1);
    assert_eq!(ties[0].key.element, Some(1));
    // C5 stems down, so the tie arcs above, half a space off the heads.
    let Shape::TieCurve(curve) = ties[0].shape else {
        panic!("expected a tie curve");
    };
    assert_eq!(
        curve,
        Curve {
            start: Point::new(116.0, 70.0),
            end: Point::new(196.0, 70.0),
            control_top: Point::new(156.0, 58.75),
            control_bottom: Point::new(156.0, 61.25),
            thickness: 2.5,
            above: true,
        }
    );
}

#[test]
fn tie_across_barline() {
    let mut first = pitched(Step::G, 4, 4, NoteType::Whole);
    first.notations = tie(StartStop::Start);
    let mut second = pitched(Step::G, 4, 4, NoteType::Whole);
    second.notations = tie(StartStop::Stop);
    let score = single_part(vec![
        measure("1", vec![Element::Note(first)]),
        measure("2", vec![Element::Note(second)]),
    ]);
    let result = layout(&score);
    let ties = shapes_of(&result.parts[0], "tie-curve");
    assert_eq!(ties.len(), 1);
    assert_eq!(ties[0].key.measure, Some(1));
}

#[test]
fn tie_stop_without_start_is_dangling() {
    let mut note = pitched(Step::C, 5, 4, NoteType::Whole);
    note.notations = tie(StartStop::Stop);
    let result = layout(&single_part(vec![measure("1", vec![Element::Note(note)])]));

    assert_eq!(shapes_of(&result.parts[0], "tie-curve").len(), 0);
    assert_eq!(
        result.issues,
        vec![LayoutIssue::DanglingNotation {
            part: 0,
            measure: 0,
            element: Some(0),
            notation: "tie".into(),
            reason: "stop without a matching start".into(),
        }]
    );
}

#[test]
fn unclosed_slur_reported_at_its_start() {
    let mut note = pitched(Step::E, 4, 4, NoteType::Whole);
    note.notations = Notations {
        slurs: vec![Slur { kind: StartStop::Start, number: 1, placement: None }],
        ..Notations::default()
    };
    let result = layout(&single_part(vec![measure("1", vec![Element::Note(note)])]));
    assert_eq!(shapes_of(&result.parts[0], "slur-curve").len(), 0);
    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].part(), 0);
    assert!(matches!(
        &result.issues[0],
        LayoutIssue::DanglingNotation { notation, element: Some(0), .. } if notation == "slur"
    ));
}

#[test]
fn tie_continue_chains_three_notes() {
    let mut notes: Vec<Element> = Vec::new();
    for kind in [StartStop::Start, StartStop::Continue, StartStop::Stop] {
        let mut note = pitched(Step::G, 4, 1, NoteType::Quarter);
        note.notations = tie(kind);
        notes.push(Element::Note(note));
    }
    let result = layout(&single_part(vec![measure("1", notes)]));
    assert!(result.issues.is_empty(), "unexpected issues: {:?}", result.issues);

    let spans: Vec<(Option<usize>, f64, f64)> = shapes_of(&result.parts[0], "tie-curve")
        .into_iter()
        .filter_map(|p| match p.shape {
            Shape::TieCurve(c) => Some((p.key.element, c.start.x, c.end.x)),
            _ => None,
        })
        .collect();
    assert_eq!(spans, vec![(Some(1), 116.0, 156.0), (Some(2), 156.0, 196.0)]);
}

// ═══════════════════════════════════════════════════════════════════════
// Slurs and tuplets
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn slur_spans_to_its_stop() {
    let slur = |kind: StartStop| Notations {
        slurs: vec![Slur { kind, number: 1, placement: None }],
        ..Notations::default()
    };
    let mut first = pitched(Step::E, 4, 1, NoteType::Quarter);
    first.notations = slur(StartStop::Start);
    let mut last = pitched(Step::C, 5, 1, NoteType::Quarter);
    last.notations = slur(StartStop::Stop);
    let score = single_part(vec![measure(
        "1",
        vec![
            four_four(Clef::treble(1)),
            Element::Note(first),
            Element::Note(pitched(Step::G, 4, 1, NoteType::Quarter)),
            Element::Note(last),
        ],
    )]);
    let result = layout(&score);
    assert!(result.issues.is_empty(), "unexpected issues: {:?}", result.issues);

    let slurs = shapes_of(&result.parts[0], "slur-curve");
    assert_eq!(slurs.len(), 1);
    assert_eq!(slurs[0].key.measure, Some(0));
    assert_eq!(slurs[0].key.element, Some(3));
    let Shape::SlurCurve(curve) = slurs[0].shape else {
        panic!("expected a slur curve");
    };
    // E4 stems up, so the slur runs below the heads.
    assert!(!curve.above);
    assert_eq!(curve.start, Point::new(116.0, 105.0));
    assert_eq!(curve.end, Point::new(196.0, 80.0));
}

#[test]
fn tuplet_bracket_over_stem_tips() {
    let tuplet = |kind: StartStop| Notations {
        tuplets: vec![Tuplet { kind, number: 1, placement: None }],
        ..Notations::default()
    };
    let mut first = pitched(Step::E, 4, 1, NoteType::Quarter);
    first.notations = tuplet(StartStop::Start);
    let mut last = pitched(Step::G, 4, 1, NoteType::Quarter);
    last.notations = tuplet(StartStop::Stop);
    let score = single_part(vec![measure(
        "1",
        vec![
            four_four(Clef::treble(1)),
            Element::Note(first),
            Element::Note(pitched(Step::F, 4, 1, NoteType::Quarter)),
            Element::Note(last),
        ],
    )]);
    let result = layout(&score);
    assert!(result.issues.is_empty(), "unexpected issues: {:?}", result.issues);

    let brackets = shapes_of(&result.parts[0], "tuplet-bracket");
    assert_eq!(brackets.len(), 1);
    assert_eq!(brackets[0].key.element, Some(3));
    // Stem tips at 65 (E4) and 55 (G4); the bracket clears the higher one.
    assert_eq!(
        brackets[0].shape,
        Shape::TupletBracket { x1: 116.0, x2: 196.0, y: 45.0, above: true }
    );
}

// ═══════════════════════════════════════════════════════════════════════
// Recoverable input problems
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn backup_past_measure_start_is_clamped() {
    let score = single_part(vec![measure(
        "1",
        vec![
            Element::Note(pitched(Step::E, 4, 1, NoteType::Quarter)),
            Element::Backup(Backup { duration: 3 }),
            Element::Note(pitched(Step::G, 4, 1, NoteType::Quarter)),
        ],
    )]);
    let result = layout(&score);

    assert_eq!(
        result.issues,
        vec![LayoutIssue::NegativeCursor {
            part: 0,
            measure: 0,
            element: 1,
            overshoot: 80.0,
        }]
    );
    let xs: Vec<f64> = result.parts[0].chords.iter().map(|c| c.x).collect();
    assert_eq!(xs, vec![116.0, 116.0]);
}

#[test]
fn note_with_impossible_octave_is_skipped() {
    let score = single_part(vec![measure(
        "1",
        vec![
            Element::Note(pitched(Step::C, i32::MAX, 1, NoteType::Quarter)),
            Element::Note(pitched(Step::F, 4, 1, NoteType::Quarter)),
        ],
    )]);
    let result = layout(&score);

    assert_eq!(
        result.issues,
        vec![LayoutIssue::MalformedScore {
            part: 0,
            measure: 0,
            element: 0,
            reason: "note octave out of range".into(),
        }]
    );
    let part = &result.parts[0];
    assert_eq!(notehead_ys(part, 0), vec![95.0]);
    assert!(shapes_of(part, "ledger-line").is_empty());
    let xs: Vec<f64> = part.chords.iter().map(|c| c.x).collect();
    assert_eq!(xs, vec![116.0]);
}

#[test]
fn note_without_duration_is_skipped() {
    let mut broken = pitched(Step::D, 4, 1, NoteType::Quarter);
    broken.duration = None;
    let score = single_part(vec![measure(
        "1",
        vec![
            Element::Note(broken),
            Element::Note(pitched(Step::F, 4, 1, NoteType::Quarter)),
        ],
    )]);
    let result = layout(&score);

    assert_eq!(
        result.issues,
        vec![LayoutIssue::MalformedScore {
            part: 0,
            measure: 0,
            element: 0,
            reason: "note has no duration".into(),
        }]
    );
    let part = &result.parts[0];
    assert_eq!(part.chords.len(), 1);
    assert_eq!(part.chords[0].members, vec![1]);
    assert_eq!(part.chords[0].x, 116.0);
    assert!(part.primitives.iter().all(|p| p.key.element != Some(0)));
}

// ═══════════════════════════════════════════════════════════════════════
// Tablature and harmony
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn tab_staff_shows_fret_numbers() {
    let tab_clef = Clef {
        staff: 1,
        sign: ClefSign::Tab,
        line: None,
        octave_change: None,
    };
    let fretted = |step: Step, octave: i32, string: i32, fret: i32, chord: bool| {
        let mut n = pitched(step, octave, 4, NoteType::Whole);
        n.chord = chord;
        n.notations.technical = vec![Technical { string, fret }];
        Element::Note(n)
    };
    let score = single_part(vec![measure(
        "1",
        vec![
            Element::Attributes(Attributes {
                clefs: vec![tab_clef],
                staff_details: vec![StaffDetails { staff: 1, lines: 6 }],
                ..Attributes::default()
            }),
            fretted(Step::E, 2, 6, 0, false),
            fretted(Step::G, 4, 1, 3, true),
        ],
    )]);
    let result = layout(&score);
    let part = &result.parts[0];

    let labels: Vec<&Shape> = shapes_of(part, "tab-fret-label").into_iter().map(|p| &p.shape).collect();
    assert_eq!(
        labels,
        vec![
            &Shape::TabFretLabel { x: 116.0, y: 60.0, string: 6, fret: 0 },
            &Shape::TabFretLabel { x: 116.0, y: 110.0, string: 1, fret: 3 },
        ]
    );
    assert_eq!(shapes_of(part, "notehead").len(), 0);
    assert_eq!(shapes_of(part, "stem").len(), 0);
    // Six lines in the prefix and six in the measure.
    assert_eq!(shapes_of(part, "staff-line").len(), 12);
}

fn c_major_harmony(frame: Option<Frame>) -> Element {
    Element::Harmony(Harmony {
        root: Some(HarmonyRoot { step: Step::C, alter: None }),
        kind: HarmonyKind::Major,
        text: None,
        bass: None,
        offset: None,
        staff: None,
        frame,
    })
}

#[test]
fn harmony_with_fretboard() {
    let frame = Frame {
        strings: 6,
        frets: 4,
        first_fret: None,
        notes: vec![
            FrameNote { string: 5, fret: 3, fingering: Some(3), barre: None },
            FrameNote { string: 4, fret: 2, fingering: Some(2), barre: None },
            FrameNote { string: 3, fret: 0, fingering: None, barre: None },
            FrameNote { string: 2, fret: 1, fingering: Some(1), barre: None },
            FrameNote { string: 1, fret: 0, fingering: None, barre: None },
        ],
    };
    let score = single_part(vec![measure(
        "1",
        vec![
            c_major_harmony(Some(frame)),
            Element::Note(pitched(Step::C, 5, 4, NoteType::Whole)),
        ],
    )]);
    let result = layout(&score);
    assert!(result.issues.is_empty(), "unexpected issues: {:?}", result.issues);
    let part = &result.parts[0];

    let symbols: Vec<&Shape> = shapes_of(part, "chord-symbol").into_iter().map(|p| &p.shape).collect();
    assert_eq!(symbols, vec![&Shape::ChordSymbol { x: 116.0, y: 30.0, text: "C".into() }]);

    let diagrams = shapes_of(part, "fretboard-diagram");
    assert_eq!(diagrams.len(), 1);
    let Shape::FretboardDiagram(ref board) = diagrams[0].shape else {
        panic!("expected a fretboard diagram");
    };
    // Centered on the symbol, 14px above its baseline.
    assert_eq!(board.origin, Point::new(101.0, -8.0));
    assert_eq!((board.width, board.height), (30.0, 24.0));
    assert_eq!(board.dots.len(), 3);
    assert_eq!(board.open_strings.len(), 2);
    assert_eq!(board.muted_strings.len(), 1);
}

#[test]
fn empty_fretboard_frame_is_malformed() {
    let frame = Frame {
        strings: 0,
        frets: 4,
        first_fret: None,
        notes: Vec::new(),
    };
    let result = layout(&single_part(vec![measure("1", vec![c_major_harmony(Some(frame))])]));
    assert!(matches!(
        result.issues.as_slice(),
        [LayoutIssue::MalformedScore { element: 0, .. }]
    ));
    // The chord text is still shown.
    assert_eq!(shapes_of(&result.parts[0], "chord-symbol").len(), 1);
    assert_eq!(shapes_of(&result.parts[0], "fretboard-diagram").len(), 0);
}

// ═══════════════════════════════════════════════════════════════════════
// Re-entrancy
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn layout_is_idempotent() {
    let score = quarter_rest_chord();
    let opts = LayoutOptions::default();
    let first = layout_to_json(&layout_score(&score, &opts)).unwrap();
    let second = layout_to_json(&layout_score(&score, &opts)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn parallel_layouts_agree() {
    let score = std::sync::Arc::new(quarter_rest_chord());
    let expected = layout_to_json(&layout(&score)).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let score = std::sync::Arc::clone(&score);
            std::thread::spawn(move || {
                layout_to_json(&layout_score(&score, &LayoutOptions::default())).unwrap()
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
